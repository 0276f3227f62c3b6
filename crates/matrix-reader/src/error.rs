//! Error types for matrix file reading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for matrix reader operations.
pub type MatrixResult<T> = Result<T, MatrixError>;

/// Error types for matrix parsing.
#[derive(Error, Debug)]
pub enum MatrixError {
    /// File I/O error, including corrupt gzip streams
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The `@` header line is not a JSON object
    #[error("invalid matrix header: {0}")]
    InvalidHeader(#[from] serde_json::Error),

    /// A data line could not be parsed
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Rows disagree on the number of values
    #[error("ragged matrix at line {line}: expected {expected} values, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Header group boundaries do not describe the rows in the file
    #[error("inconsistent group boundaries: {0}")]
    InvalidGroups(String),

    /// File contains no lines or no regions
    #[error("empty matrix: {}", .0.display())]
    Empty(PathBuf),
}
