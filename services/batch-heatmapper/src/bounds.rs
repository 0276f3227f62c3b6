//! Global color bounds from per-file percentiles.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use matrix_reader::HeatmapMatrix;
use tracing::{debug, info};

use crate::config::BatchConfig;
use crate::pool::parallel_map;
use crate::{BatchError, BatchResult};

/// Percentile used for the lower bound; clips the darkest outliers
pub const LOWER_PERCENTILE: f64 = 1.0;

/// Percentile used for the upper bound
pub const UPPER_PERCENTILE: f64 = 98.0;

/// Which end of the color scale is being estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

impl Bound {
    pub fn percentile(self) -> f64 {
        match self {
            Bound::Lower => LOWER_PERCENTILE,
            Bound::Upper => UPPER_PERCENTILE,
        }
    }

    /// Name of the matching command-line option.
    pub fn flag(self) -> &'static str {
        match self {
            Bound::Lower => "zMin",
            Bound::Upper => "zMax",
        }
    }
}

/// Bounds applied to every heatmap of a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalBounds {
    pub z_min: f64,
    pub z_max: f64,
}

/// Percentile of ascending `sorted` values, interpolating linearly
/// between the two nearest order statistics. `None` when empty.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    let fraction = rank - low as f64;
    Some(sorted[low] + (sorted[high] - sorted[low]) * fraction)
}

/// Percentile of one file's finite values.
pub fn estimate_bound(path: &PathBuf, bound: Bound) -> BatchResult<(PathBuf, f64)> {
    let matrix = HeatmapMatrix::from_path(path).map_err(|source| BatchError::Matrix {
        path: path.clone(),
        source,
    })?;

    let mut values = matrix.flatten_finite();
    values.sort_by(f64::total_cmp);
    let value = percentile(&values, bound.percentile())
        .ok_or_else(|| BatchError::NoFiniteValues(path.clone()))?;

    debug!(
        path = %path.display(),
        bound = bound.flag(),
        percentile = bound.percentile(),
        values = values.len(),
        value,
        "Estimated bound"
    );
    Ok((path.clone(), value))
}

/// Largest per-file estimate across `files`.
pub fn global_bound(files: &[PathBuf], workers: NonZeroUsize, bound: Bound) -> BatchResult<f64> {
    let table = parallel_map(files, workers, |path| estimate_bound(path, bound))?;
    table
        .values()
        .copied()
        .reduce(f64::max)
        .ok_or(BatchError::NoInputFiles)
}

/// Use supplied bounds as-is and estimate the missing ones.
pub fn resolve_bounds(config: &BatchConfig) -> BatchResult<GlobalBounds> {
    let resolve = |supplied: Option<f64>, bound: Bound| -> BatchResult<f64> {
        match supplied {
            Some(value) => {
                info!(bound = bound.flag(), value, "Using supplied bound");
                Ok(value)
            }
            None => {
                info!(
                    bound = bound.flag(),
                    percentile = bound.percentile(),
                    "Estimating bound from matrices"
                );
                let value = global_bound(&config.files, config.workers, bound)?;
                info!(bound = bound.flag(), value, "Estimated global bound");
                Ok(value)
            }
        }
    };

    let z_max = resolve(config.z_max, Bound::Upper)?;
    let z_min = resolve(config.z_min, Bound::Lower)?;
    Ok(GlobalBounds { z_min, z_max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, write_matrix, MatrixBuilder};

    fn one_to_hundred() -> Vec<f64> {
        (1..=100).map(|v| v as f64).collect()
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let values = one_to_hundred();
        assert_approx_eq!(percentile(&values, 98.0).unwrap(), 98.02, 1e-9);
        assert_approx_eq!(percentile(&values, 1.0).unwrap(), 1.99, 1e-9);
        assert_approx_eq!(percentile(&values, 50.0).unwrap(), 50.5, 1e-9);
    }

    #[test]
    fn test_percentile_edges() {
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[4.0], 98.0), Some(4.0));
        assert_eq!(percentile(&[1.0, 2.0], 0.0), Some(1.0));
        assert_eq!(percentile(&[1.0, 2.0], 100.0), Some(2.0));
    }

    #[test]
    fn test_estimate_ignores_non_finite() {
        let dir = tempfile::tempdir().unwrap();
        // 1..=100 plus a NaN and an inf column that must not count
        let text = MatrixBuilder::new(12).group("genes", 10).build(|row, col| match col {
            10 => f64::NAN,
            11 => f64::INFINITY,
            _ => (row * 10 + col + 1) as f64,
        });
        let path = write_matrix(dir.path(), "m.gz", &text, true);

        let (_, upper) = estimate_bound(&path, Bound::Upper).unwrap();
        let (_, lower) = estimate_bound(&path, Bound::Lower).unwrap();
        assert_approx_eq!(upper, 98.02, 1e-9);
        assert_approx_eq!(lower, 1.99, 1e-9);
    }

    #[test]
    fn test_all_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let text = MatrixBuilder::new(2).group("genes", 2).build(|_, _| f64::NAN);
        let path = write_matrix(dir.path(), "nan.gz", &text, true);

        assert!(matches!(
            estimate_bound(&path, Bound::Upper),
            Err(BatchError::NoFiniteValues(_))
        ));
    }

    #[test]
    fn test_global_bound_is_max_of_files() {
        let dir = tempfile::tempdir().unwrap();
        let low = MatrixBuilder::new(10).group("genes", 10).build(|r, c| (r * 10 + c) as f64);
        let high = MatrixBuilder::new(10).group("genes", 10).build(|r, c| (r * 10 + c) as f64 * 2.0);
        let files = vec![
            write_matrix(dir.path(), "low.gz", &low, true),
            write_matrix(dir.path(), "high.gz", &high, true),
        ];

        let (_, low_upper) = estimate_bound(&files[0], Bound::Upper).unwrap();
        let (_, high_upper) = estimate_bound(&files[1], Bound::Upper).unwrap();
        let global = global_bound(&files, NonZeroUsize::new(2).unwrap(), Bound::Upper).unwrap();
        assert_eq!(global, low_upper.max(high_upper));
        assert_eq!(global, high_upper);
    }
}
