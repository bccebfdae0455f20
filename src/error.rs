//! Error types for dataset loading and export.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors that can occur while reading or writing complaint data.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The input file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent from the header row.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The CSV itself is malformed (bad quoting, ragged rows, bad UTF-8).
    #[error("CSV error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// A `Date received` value matched none of the accepted formats.
    #[error("unparseable date '{value}' at line {line}")]
    InvalidDate { line: u64, value: String },

    /// Writing the export failed.
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
