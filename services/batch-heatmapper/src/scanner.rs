//! Per-file line counts used to scale heatmap heights.

use std::path::PathBuf;

use tracing::debug;

use crate::{BatchError, BatchResult};

/// Count the lines of one matrix file, gzip or plain.
///
/// Zero-line files are rejected: they would get a zero height.
pub fn file_length(path: &PathBuf) -> BatchResult<(PathBuf, u64)> {
    let lines = matrix_reader::count_lines(path).map_err(|source| BatchError::Matrix {
        path: path.clone(),
        source,
    })?;
    if lines == 0 {
        return Err(BatchError::EmptyFile(path.clone()));
    }

    debug!(path = %path.display(), lines, "Counted lines");
    Ok((path.clone(), lines))
}
