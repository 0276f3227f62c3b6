//! Error types for heatmap rendering.

use thiserror::Error;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Requested format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid heatmap options: {0}")]
    InvalidOptions(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid colormap: {0}")]
    InvalidColorMap(String),

    #[error("Failed to read matrix: {0}")]
    Matrix(#[from] matrix_reader::MatrixError),

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
