//! Renaming, region filtering and numeric coercion of the long table.
//!
//! Steps run in a fixed order: rename, filter to [`TARGET_REGION`], then
//! extract the decimal from each raw `value` and drop the rows without one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::TransformResult;
use crate::logs::{log_info, log_success, log_warning};
use crate::table::{Cell, Table};
use super::reshape::VALUE_COLUMN;

/// Column holding the region code once renamed.
pub const REGION_COLUMN: &str = "region";

/// The only region kept in the output.
pub const TARGET_REGION: &str = "PT";

/// Digits, a literal point, exactly one digit not followed by another digit.
pub const DECIMAL_PATTERN: &str = r"([0-9]+\.[0-9])(?:[^0-9]|$)";

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(DECIMAL_PATTERN).expect("DECIMAL_PATTERN is a valid regex"));

/// Row counts observed while normalizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    /// Rows in the long table.
    pub input_rows: usize,
    /// Rows left after the region filter.
    pub region_rows: usize,
    /// Region rows dropped because no decimal could be extracted.
    pub dropped_values: usize,
    /// Rows in the clean table.
    pub output_rows: usize,
}

/// First one-fractional-digit decimal literal in `text`.
///
/// ```
/// use life_expectancy::transform::normalize::extract_decimal_literal;
///
/// assert_eq!(extract_decimal_literal("82.3 b"), Some("82.3"));
/// assert_eq!(extract_decimal_literal("82.35"), None);
/// ```
pub fn extract_decimal_literal(text: &str) -> Option<&str> {
    DECIMAL_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse the first one-fractional-digit decimal in `text`.
///
/// Annotations around the number (`"82.3 b"`, `"82.3e"`) are ignored.
/// Returns `None` for text without such a literal, like `"5"`, `"n/a"` or
/// `": "`.
pub fn extract_decimal(text: &str) -> Option<f64> {
    extract_decimal_literal(text)
        .and_then(|literal| literal.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Apply `old -> new` column renames. `None` or an empty map is a no-op.
pub fn rename_columns(table: &Table, rename: Option<&HashMap<String, String>>) -> Table {
    match rename {
        Some(mapping) if !mapping.is_empty() => table.rename(mapping),
        _ => table.clone(),
    }
}

/// Keep only rows whose region is [`TARGET_REGION`].
pub fn filter_region(table: &Table) -> TransformResult<Table> {
    table.filter_eq(REGION_COLUMN, TARGET_REGION)
}

/// Replace raw `value` text with its decimal and drop rows without one.
pub fn reformat_values(table: &Table) -> TransformResult<Table> {
    let parsed = table.map_column(VALUE_COLUMN, |cell| match cell {
        Cell::Text(text) => extract_decimal(text).map(Cell::Number).unwrap_or(Cell::Null),
        Cell::Number(n) if n.is_finite() => Cell::Number(*n),
        _ => Cell::Null,
    })?;
    parsed.drop_nulls(VALUE_COLUMN)
}

/// Run rename, region filter and value reformatting in order.
pub fn normalize(
    long: &Table,
    rename: Option<&HashMap<String, String>>,
) -> TransformResult<(Table, NormalizeStats)> {
    let renamed = rename_columns(long, rename);

    let regional = filter_region(&renamed)?;
    log_info(format!(
        "Kept {} of {} rows for region {}",
        regional.height(),
        renamed.height(),
        TARGET_REGION
    ));

    let clean = reformat_values(&regional)?;
    let stats = NormalizeStats {
        input_rows: long.height(),
        region_rows: regional.height(),
        dropped_values: regional.height() - clean.height(),
        output_rows: clean.height(),
    };

    if stats.dropped_values > 0 {
        log_warning(format!(
            "{} rows dropped (no numeric value)",
            stats.dropped_values
        ));
    }
    log_success(format!("{} clean rows", clean.height()));

    Ok((clean, stats))
}
