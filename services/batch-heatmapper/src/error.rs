//! Error types for batch runs.

use std::path::PathBuf;
use thiserror::Error;

use crate::render::RendererError;

/// Result type alias using BatchError.
pub type BatchResult<T> = Result<T, BatchError>;

/// Any failure that aborts a batch phase.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no input files given")]
    NoInputFiles,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to read {}: {source}", path.display())]
    Matrix {
        path: PathBuf,
        #[source]
        source: matrix_reader::MatrixError,
    },

    #[error("{} contains no lines", .0.display())]
    EmptyFile(PathBuf),

    #[error("{} has no finite values to estimate bounds from", .0.display())]
    NoFiniteValues(PathBuf),

    #[error("cannot derive an output file name from {}", .0.display())]
    InvalidOutputPath(PathBuf),

    #[error("rendering {} failed: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: RendererError,
    },

    #[error("renderer help unavailable: {0}")]
    RendererHelp(#[source] RendererError),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
