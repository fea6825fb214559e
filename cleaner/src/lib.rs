//! # Life Expectancy - tidy reshaper for the Eurostat life expectancy table
//!
//! Reads the wide, tab-separated Eurostat extract, reshapes it into long
//! (tidy) form, keeps the Portuguese series and writes it as CSV.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  TSV File   │────▶│   Loader    │────▶│  Reshape +  │────▶│  CSV File   │
//! │   (wide)    │     │  (parser)   │     │  Normalize  │     │  (PT, long) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use life_expectancy::{clean_data, Config};
//!
//! let summary = clean_data(&Config::from_env()).unwrap();
//! println!("Wrote {} rows", summary.stats.clean_rows);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`table`] - Ordered-columns table
//! - [`parser`] - Delimited text loading
//! - [`transform`] - Reshape, normalize, pipeline
//! - [`writer`] - CSV output
//! - [`config`] - Input/output paths
//! - [`logs`] - Leveled logging helpers

// Core modules
pub mod error;
pub mod table;

// Stages
pub mod parser;
pub mod transform;
pub mod writer;

// Ambient
pub mod config;
pub mod logs;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    ErrorKind, LoadError, PipelineError, PipelineResult, TransformError, WriteError,
};

pub use table::{Cell, Column, Table};

pub use parser::{
    detect_delimiter, detect_encoding, load_raw_table, load_table, load_table_auto, parse_table,
};

pub use transform::{
    clean_data, extract_decimal, normalize, parse_key_header, preview, reshape, transform_table,
    DataCleaner, NormalizeStats, PipelineSummary, TransformOptions, TransformStats,
    DEFAULT_ID_VARS,
};

pub use writer::{to_csv_string, write_table};

pub use config::Config;
