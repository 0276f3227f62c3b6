//! Batch heatmap generation.
//!
//! A batch runs three phases on a worker pool, strictly in sequence:
//! 1. Line counts of every matrix file
//! 2. Global color bounds (skipped for bounds given on the command line)
//! 3. One render per file with the shared bounds and a height scaled to
//!    the file's size

pub mod args;
pub mod bounds;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod pool;
pub mod render;
pub mod scanner;

pub use args::{Args, RendererKind};
pub use bounds::GlobalBounds;
pub use config::{BatchConfig, RendererBackend};
pub use dispatch::RenderJob;
pub use error::{BatchError, BatchResult};
pub use render::{HeatmapRenderer, RendererError};

use tracing::info;

/// What a finished batch did.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub bounds: GlobalBounds,
    pub max_lines: u64,
    /// One per input file, in input order
    pub jobs: Vec<RenderJob>,
}

/// Run every phase of a batch with `renderer`.
pub fn run_batch(config: &BatchConfig, renderer: &dyn HeatmapRenderer) -> BatchResult<BatchReport> {
    if config.files.is_empty() {
        return Err(BatchError::NoInputFiles);
    }
    info!(
        workers = config.workers.get(),
        files = config.files.len(),
        "Initialized {} workers",
        config.workers
    );

    info!("Counting matrix lines");
    let line_counts = pool::parallel_map(&config.files, config.workers, scanner::file_length)?;
    let max_lines = line_counts.values().copied().max().unwrap_or(0);
    info!(max_lines, "Counted matrix lines");

    let bounds = bounds::resolve_bounds(config)?;
    info!(z_min = bounds.z_min, z_max = bounds.z_max, "Using global bounds");

    let jobs = dispatch::plan_jobs(config, &line_counts, bounds)?;
    let written = dispatch::dispatch(&jobs, config.workers, renderer)?;
    info!(images = written.len(), renderer = renderer.name(), "Batch complete");

    Ok(BatchReport {
        bounds,
        max_lines,
        jobs,
    })
}
