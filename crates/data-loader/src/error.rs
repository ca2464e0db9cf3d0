//! Error types for the data-loader crate.
//!
//! Only load-time failures live here. Query-time conditions (unknown title,
//! missing catalog metadata) are not errors and never produce one of these.

use thiserror::Error;

/// Errors that can occur while loading and validating the artifacts
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// One or more required artifact files are missing
    ///
    /// All missing files are collected before failing so the operator can
    /// fix them in one go.
    #[error("Missing files: {}", files.join(", "))]
    MissingArtifacts { files: Vec<String> },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in an artifact file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Pivot rows and similarity matrix don't line up
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
