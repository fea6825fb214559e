//! High-level pipeline API: extract, transform, load.
//!
//! [`DataCleaner`] runs the stages one at a time and keeps each stage's
//! output, while [`clean_data`] runs the whole thing with the fixed
//! parameters for the Portuguese life expectancy extract.
//!
//! # Example
//!
//! ```rust,no_run
//! use life_expectancy::{DataCleaner, TransformOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = TransformOptions::default();
//!     let mut cleaner = DataCleaner::new("data/eu_life_expectancy_raw.tsv");
//!     cleaner.extract()?;
//!     cleaner.transform(&options.id_vars, Some(&options.rename))?;
//!     cleaner.load("data/pt_life_expectancy.csv")?;
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult, TransformResult};
use crate::logs::{log_info, log_info_indent, log_success};
use crate::parser::load_raw_table;
use crate::table::Table;
use crate::writer::write_table;
use super::normalize::{normalize, NormalizeStats};
use super::reshape::reshape;

/// Key fields packed in the first column of the source file.
pub const DEFAULT_ID_VARS: [&str; 4] = ["unit", "sex", "age", "geo"];

/// Parameters of the transform stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOptions {
    /// Key fields carried into the long table, in output order.
    pub id_vars: Vec<String>,
    /// Column renames applied after reshaping (`old -> new`).
    pub rename: HashMap<String, String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            id_vars: DEFAULT_ID_VARS.iter().map(|s| s.to_string()).collect(),
            rename: HashMap::from([("geo".to_string(), "region".to_string())]),
        }
    }
}

/// Row counts across the transform stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub raw_rows: usize,
    pub year_columns: usize,
    pub long_rows: usize,
    pub region_rows: usize,
    pub dropped_values: usize,
    pub clean_rows: usize,
}

impl TransformStats {
    fn new(raw: &Table, normalized: NormalizeStats) -> Self {
        Self {
            raw_rows: raw.height(),
            year_columns: raw.width().saturating_sub(1),
            long_rows: normalized.input_rows,
            region_rows: normalized.region_rows,
            dropped_values: normalized.dropped_values,
            clean_rows: normalized.output_rows,
        }
    }
}

/// Outcome of [`clean_data`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub stats: TransformStats,
}

/// Reshape then normalize a raw table.
pub fn transform_table<S: AsRef<str>>(
    raw: &Table,
    id_vars: &[S],
    rename: Option<&HashMap<String, String>>,
) -> TransformResult<(Table, TransformStats)> {
    let long = reshape(raw, id_vars)?;
    let (clean, normalized) = normalize(&long, rename)?;
    Ok((clean, TransformStats::new(raw, normalized)))
}

/// Runs the ETL stages over one input file.
///
/// Each stage stores a new table; nothing is modified once produced.
#[derive(Debug)]
pub struct DataCleaner {
    input_path: PathBuf,
    raw: Option<Table>,
    clean: Option<Table>,
    stats: Option<TransformStats>,
}

impl DataCleaner {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            raw: None,
            clean: None,
            stats: None,
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Load the raw table from the input file.
    pub fn extract(&mut self) -> PipelineResult<()> {
        log_info("📖 Extracting...");
        self.raw = Some(load_raw_table(&self.input_path)?);
        self.clean = None;
        self.stats = None;
        Ok(())
    }

    /// Reshape, rename, filter and reformat the extracted table.
    pub fn transform<S: AsRef<str>>(
        &mut self,
        id_vars: &[S],
        rename: Option<&HashMap<String, String>>,
    ) -> PipelineResult<()> {
        let raw = self.raw.as_ref().ok_or(PipelineError::StageOrder("extract"))?;
        log_info("⚙️  Transforming...");
        let (clean, stats) = transform_table(raw, id_vars, rename)?;
        self.clean = Some(clean);
        self.stats = Some(stats);
        Ok(())
    }

    /// Write the clean table to `output_path`.
    pub fn load(&self, output_path: impl AsRef<Path>) -> PipelineResult<()> {
        let clean = self.clean.as_ref().ok_or(PipelineError::StageOrder("transform"))?;
        log_info("💾 Loading...");
        write_table(clean, output_path)?;
        Ok(())
    }

    pub fn raw(&self) -> Option<&Table> {
        self.raw.as_ref()
    }

    pub fn clean(&self) -> Option<&Table> {
        self.clean.as_ref()
    }

    pub fn stats(&self) -> Option<TransformStats> {
        self.stats
    }
}

/// Run extract, transform and load with the default options.
pub fn clean_data(config: &Config) -> PipelineResult<PipelineSummary> {
    config.validate()?;
    let options = TransformOptions::default();

    let mut cleaner = DataCleaner::new(&config.input_path);
    cleaner.extract()?;
    cleaner.transform(&options.id_vars, Some(&options.rename))?;
    cleaner.load(&config.output_path)?;

    let stats = cleaner.stats().unwrap_or_default();
    print_stats(&stats);

    Ok(PipelineSummary {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        stats,
    })
}

/// Extract and transform without writing; return the first `limit` clean rows
/// as JSON objects keyed by column name.
pub fn preview(
    input_path: impl AsRef<Path>,
    options: &TransformOptions,
    limit: usize,
) -> PipelineResult<Vec<Value>> {
    let mut cleaner = DataCleaner::new(input_path.as_ref());
    cleaner.extract()?;
    cleaner.transform(&options.id_vars, Some(&options.rename))?;

    let clean = cleaner.clean().ok_or(PipelineError::StageOrder("transform"))?;
    Ok(clean.to_records()?.into_iter().take(limit).collect())
}

fn print_stats(stats: &TransformStats) {
    log_success("Pipeline finished");
    log_info_indent(format!("raw rows: {}", stats.raw_rows), 1);
    log_info_indent(format!("year columns: {}", stats.year_columns), 1);
    log_info_indent(format!("long rows: {}", stats.long_rows), 1);
    log_info_indent(format!("region rows: {}", stats.region_rows), 1);
    log_info_indent(format!("clean rows: {}", stats.clean_rows), 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;

    const RAW: &str = "unit,sex,age,geo\\time\t2011 \t2010 \n\
                       YR,F,Y1,PT\t81.9 \t82.3 b\n\
                       YR,F,Y1,DE\t80.1 \t80.0\n\
                       YR,M,Y1,PT\t: \t5\n";

    fn write_raw(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("raw.tsv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_options() {
        let opts = TransformOptions::default();
        assert_eq!(opts.id_vars, DEFAULT_ID_VARS);
        assert_eq!(opts.rename.get("geo").map(String::as_str), Some("region"));
    }

    #[test]
    fn test_stage_order_enforced() {
        let mut cleaner = DataCleaner::new("unused.tsv");
        let err = cleaner.transform(&DEFAULT_ID_VARS, None).unwrap_err();
        assert!(matches!(err, PipelineError::StageOrder("extract")));

        let err = cleaner.load("unused.csv").unwrap_err();
        assert!(matches!(err, PipelineError::StageOrder("transform")));
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_stages_keep_their_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_raw(dir.path(), RAW);
        let options = TransformOptions::default();

        let mut cleaner = DataCleaner::new(&input);
        cleaner.extract().unwrap();
        cleaner.transform(&options.id_vars, Some(&options.rename)).unwrap();

        assert_eq!(cleaner.raw().unwrap().height(), 3);
        assert_eq!(cleaner.clean().unwrap().height(), 2);
        assert_eq!(
            cleaner.stats().unwrap(),
            TransformStats {
                raw_rows: 3,
                year_columns: 2,
                long_rows: 6,
                region_rows: 4,
                dropped_values: 2,
                clean_rows: 2,
            }
        );
    }

    #[test]
    fn test_clean_data_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            input_path: write_raw(dir.path(), RAW),
            output_path: dir.path().join("pt.csv"),
        };

        let summary = clean_data(&config).unwrap();
        assert_eq!(summary.stats.clean_rows, 2);

        let written = fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(
            written,
            "unit,sex,age,region,year,value\n\
             YR,F,Y1,PT,2011,81.9\n\
             YR,F,Y1,PT,2010,82.3\n"
        );
    }

    #[test]
    fn test_preview_limits_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_raw(dir.path(), RAW);

        let rows = preview(&input, &TransformOptions::default(), 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["region"], "PT");
        assert_eq!(rows[0]["year"], "2011");
        assert_eq!(rows[0]["value"], 81.9);
    }
}
