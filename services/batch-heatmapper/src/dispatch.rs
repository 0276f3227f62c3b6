//! Render job planning and dispatch.

use std::collections::HashMap;
use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use renderer::ImageFormat;
use tracing::info;

use crate::bounds::GlobalBounds;
use crate::config::BatchConfig;
use crate::pool::parallel_map;
use crate::render::HeatmapRenderer;
use crate::{BatchError, BatchResult};

/// Height in cm given to the file with the most lines
pub const MAX_HEATMAP_HEIGHT: f64 = 25.0;

/// One heatmap to render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub matrix: PathBuf,
    pub output: PathBuf,
    pub z_min: f64,
    pub z_max: f64,
    /// Heatmap height in cm
    pub heatmap_height: f64,
    /// Renderer flags passed through verbatim
    pub extra_flags: Vec<OsString>,
}

/// Output path for `input`, placed beside it.
///
/// The last extension of the input is dropped, `.suffix` is appended when
/// set, the prefix is put in front of that whole suffixed stem, and the
/// image extension comes last: `sample.txt` with prefix `P`, suffix `S`
/// and png gives `Psample.S.png`.
pub fn output_path(
    input: &Path,
    prefix: &str,
    suffix: &str,
    format: ImageFormat,
) -> BatchResult<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| BatchError::InvalidOutputPath(input.to_path_buf()))?;

    let mut name = OsString::from(stem);
    if !suffix.is_empty() {
        name.push(".");
        name.push(suffix);
    }
    let mut name = if prefix.is_empty() {
        name
    } else {
        let mut prefixed = OsString::from(prefix);
        prefixed.push(name);
        prefixed
    };
    name.push(".");
    name.push(format.extension());

    Ok(input.with_file_name(name))
}

/// Height proportional to the file's share of the longest file.
pub fn heatmap_height(lines: u64, max_lines: u64) -> f64 {
    lines as f64 / max_lines as f64 * MAX_HEATMAP_HEIGHT
}

/// Build one job per input file, in input order.
pub fn plan_jobs(
    config: &BatchConfig,
    line_counts: &HashMap<PathBuf, u64>,
    bounds: GlobalBounds,
) -> BatchResult<Vec<RenderJob>> {
    let max_lines = line_counts
        .values()
        .copied()
        .max()
        .ok_or(BatchError::NoInputFiles)?;

    config
        .files
        .iter()
        .map(|file| {
            let lines = line_counts.get(file).copied().ok_or_else(|| {
                BatchError::InvalidArgument(format!("no line count for {}", file.display()))
            })?;
            Ok(RenderJob {
                matrix: file.clone(),
                output: output_path(file, &config.prefix, &config.suffix, config.format)?,
                z_min: bounds.z_min,
                z_max: bounds.z_max,
                heatmap_height: heatmap_height(lines, max_lines),
                extra_flags: config.pass_through.clone(),
            })
        })
        .collect()
}

/// Render every job on the worker pool. Returns input → output paths.
pub fn dispatch(
    jobs: &[RenderJob],
    workers: NonZeroUsize,
    renderer: &dyn HeatmapRenderer,
) -> BatchResult<HashMap<PathBuf, PathBuf>> {
    let by_matrix: HashMap<&Path, &RenderJob> =
        jobs.iter().map(|job| (job.matrix.as_path(), job)).collect();
    let matrices: Vec<PathBuf> = jobs.iter().map(|job| job.matrix.clone()).collect();

    parallel_map(&matrices, workers, |matrix| {
        let job = by_matrix[matrix.as_path()];
        info!(
            matrix = %job.matrix.display(),
            output = %job.output.display(),
            height = job.heatmap_height,
            renderer = renderer.name(),
            "Rendering heatmap"
        );
        renderer.render(job).map_err(|source| BatchError::Render {
            path: matrix.clone(),
            source,
        })?;
        Ok((matrix.clone(), job.output.clone()))
    })
}
