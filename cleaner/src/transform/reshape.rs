//! Wide to long reshaping.
//!
//! The source table packs its key fields into the first column, both in the
//! header (`unit,sex,age,geo\time`) and in each row (`YR,F,Y1,PT`). The
//! reshaper unpacks them into one column per field and melts the year columns
//! into `year` / `value` pairs.

use crate::error::{TransformError, TransformResult};
use crate::logs::log_info;
use crate::table::{Column, Table};

/// Separator between key fields, in the header and in every row.
pub const KEY_SEPARATOR: char = ',';

/// Separator between the key field names and the year axis label.
pub const HEADER_GROUP_SEPARATOR: char = '\\';

/// Name of the melted label column.
pub const YEAR_COLUMN: &str = "year";

/// Name of the melted value column.
pub const VALUE_COLUMN: &str = "value";

/// Parse the composite key header into field names.
///
/// Both separators are treated alike and the last token (the year axis
/// label, `time` in Eurostat files) is discarded.
///
/// ```
/// use life_expectancy::transform::reshape::parse_key_header;
///
/// let fields = parse_key_header("unit,sex,age,geo\\time").unwrap();
/// assert_eq!(fields, vec!["unit", "sex", "age", "geo"]);
/// ```
pub fn parse_key_header(header: &str) -> TransformResult<Vec<String>> {
    let mut tokens: Vec<&str> = header
        .split(|c: char| c == KEY_SEPARATOR || c == HEADER_GROUP_SEPARATOR)
        .collect();
    tokens.pop();

    if tokens.is_empty() {
        return Err(TransformError::MalformedHeader(format!(
            "'{}' names no key fields",
            header
        )));
    }
    if tokens.iter().any(|t| t.is_empty()) {
        return Err(TransformError::MalformedHeader(format!(
            "'{}' contains an empty field name",
            header
        )));
    }

    Ok(tokens.into_iter().map(str::to_string).collect())
}

/// Split the composite key column into one text column per field.
///
/// Every value must split into exactly `fields.len()` tokens.
pub fn split_key_column(column: &Column, fields: &[String]) -> TransformResult<Table> {
    let mut split: Vec<Vec<&str>> = fields.iter().map(|_| Vec::with_capacity(column.len())).collect();

    for (row, cell) in column.cells().iter().enumerate() {
        let value = cell.as_str().unwrap_or("");
        let tokens: Vec<&str> = value.split(KEY_SEPARATOR).collect();
        if tokens.len() != fields.len() {
            return Err(TransformError::KeyTokenCount {
                row: row + 1,
                expected: fields.len(),
                found: tokens.len(),
                value: value.to_string(),
            });
        }
        for (out, token) in split.iter_mut().zip(tokens) {
            out.push(token);
        }
    }

    Table::new(
        fields
            .iter()
            .zip(split)
            .map(|(name, values)| Column::from_strings(name.clone(), values))
            .collect(),
    )
}

/// Every column after the first, with surrounding whitespace stripped from
/// its name.
///
/// Names may repeat after trimming (`"2020"` and `"2020 "`); the columns
/// stay separate.
pub fn year_columns(raw: &Table) -> TransformResult<Table> {
    let columns = raw
        .columns()
        .iter()
        .skip(1)
        .map(|c| c.renamed(c.name().trim()))
        .collect();
    Table::new(columns)
}

/// Reshape the wide table into long form.
///
/// Output columns are `id_vars` in order, then `year` and `value`. Key
/// fields not listed in `id_vars` are dropped. Rows are ordered by source
/// row, then by year column position.
pub fn reshape<S: AsRef<str>>(raw: &Table, id_vars: &[S]) -> TransformResult<Table> {
    let key_column = raw
        .columns()
        .first()
        .ok_or_else(|| TransformError::MalformedHeader("table has no columns".to_string()))?;

    let fields = parse_key_header(key_column.name())?;
    if fields.len() < id_vars.len() {
        return Err(TransformError::TooFewKeyFields {
            expected: id_vars.len(),
            found: fields.len(),
            header: key_column.name().to_string(),
        });
    }

    let keys = split_key_column(key_column, &fields)?;
    let years = year_columns(raw)?;
    log_info(format!(
        "Key fields: {} | {} year columns",
        fields.join(", "),
        years.width()
    ));

    let long = keys.unpivot(id_vars, &years, YEAR_COLUMN, VALUE_COLUMN)?;
    log_info(format!("Reshaped {} rows into {} long rows", raw.height(), long.height()));
    Ok(long)
}
