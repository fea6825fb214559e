//! Error types for the life expectancy cleaning pipeline.
//!
//! Each pipeline stage has its own error enum:
//!
//! - [`LoadError`] - reading and parsing the source file
//! - [`TransformError`] - reshaping, renaming, filtering
//! - [`WriteError`] - serializing the cleaned table
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Every error maps onto one [`ErrorKind`] so callers can branch on the
//! coarse category without matching each variant.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Error Kinds
// =============================================================================

/// Coarse error category shared by all pipeline errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input path missing or unreadable.
    SourceUnavailable,
    /// Structural assumptions about the input were violated.
    MalformedInput,
    /// Output path not writable.
    DestinationUnavailable,
    /// Stages invoked out of order or configuration unusable.
    Usage,
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while loading a delimited file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file could not be opened or read.
    #[error("Cannot read '{}': {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is not a well-formed delimited table.
    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: u64, message: String },

    /// No header line.
    #[error("Input file is empty (no header row)")]
    EmptyFile,

    /// Fewer columns than a wide table needs.
    #[error("Expected at least 2 columns, found {found}")]
    TooFewColumns { found: usize },
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while reshaping or normalizing a table.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The composite key header could not be parsed.
    #[error("Malformed key header: {0}")]
    MalformedHeader(String),

    /// The key header names fewer fields than requested.
    #[error("Key header '{header}' names {found} fields, {expected} required")]
    TooFewKeyFields {
        expected: usize,
        found: usize,
        header: String,
    },

    /// A composite key did not split into the expected number of tokens.
    #[error("Row {row}: key '{value}' has {found} fields, expected {expected}")]
    KeyTokenCount {
        row: usize,
        expected: usize,
        found: usize,
        value: String,
    },

    /// A referenced column does not exist.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A column does not have the table's row count.
    #[error("Column '{column}' has {found} rows, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A row does not have one cell per header.
    #[error("Row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// NaN or infinity where a JSON number is needed.
    #[error("Row {row}: column '{column}' holds a non-finite number")]
    NonFiniteNumber { column: String, row: usize },
}

// =============================================================================
// Write Errors
// =============================================================================

/// Errors while writing the output file.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The destination could not be created or written.
    #[error("Cannot write '{}': {source}", .path.display())]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::DataCleaner`]
/// and [`crate::transform::pipeline::clean_data`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Reshape or normalization failed.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Writing failed.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// A stage ran before the stage it depends on.
    #[error("Stage '{0}' has not run yet")]
    StageOrder(&'static str),

    /// Configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            LoadError::MalformedInput { .. }
            | LoadError::EmptyFile
            | LoadError::TooFewColumns { .. } => ErrorKind::MalformedInput,
        }
    }
}

impl WriteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WriteError::DestinationUnavailable { .. } => ErrorKind::DestinationUnavailable,
            // csv wraps the io error of the underlying file
            WriteError::Csv(_) => ErrorKind::DestinationUnavailable,
        }
    }
}

impl PipelineError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Load(e) => e.kind(),
            PipelineError::Transform(_) => ErrorKind::MalformedInput,
            PipelineError::Write(e) => e.kind(),
            PipelineError::StageOrder(_) | PipelineError::Config(_) => ErrorKind::Usage,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for write operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // LoadError -> PipelineError
        let load_err = LoadError::EmptyFile;
        let pipeline_err: PipelineError = load_err.into();
        assert!(pipeline_err.to_string().contains("empty"));
        assert_eq!(pipeline_err.kind(), ErrorKind::MalformedInput);

        // TransformError -> PipelineError
        let transform_err = TransformError::MissingColumn("region".into());
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("region"));
        assert_eq!(pipeline_err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_io_errors_map_to_kinds() {
        let missing = LoadError::SourceUnavailable {
            path: PathBuf::from("nope.tsv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(missing.kind(), ErrorKind::SourceUnavailable);
        assert!(missing.to_string().contains("nope.tsv"));

        let denied: PipelineError = WriteError::DestinationUnavailable {
            path: PathBuf::from("/out.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(denied.kind(), ErrorKind::DestinationUnavailable);
    }

    #[test]
    fn test_key_token_count_format() {
        let err = TransformError::KeyTokenCount {
            row: 3,
            expected: 4,
            found: 2,
            value: "YR,F".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 3"));
        assert!(msg.contains("YR,F"));
        assert!(msg.contains("expected 4"));
    }

    #[test]
    fn test_stage_order_is_usage() {
        let err = PipelineError::StageOrder("extract");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.to_string().contains("extract"));
    }
}
