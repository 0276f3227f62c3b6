//! Renderer backends: one heatmap image per render job.

mod command;
mod native;

pub use command::CommandRenderer;
pub use native::{HeatmapperArgs, NativeRenderer};

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::dispatch::RenderJob;

/// Failure of a single render.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("invalid renderer arguments: {0}")]
    Arguments(#[from] clap::Error),

    #[error(transparent)]
    Heatmap(#[from] renderer::RenderError),

    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}: {stderr}", program.display())]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

/// Something that turns a matrix file into a heatmap image.
///
/// Implementations are shared by every worker thread of a batch.
pub trait HeatmapRenderer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Help text for the flags the renderer accepts.
    fn help(&self) -> Result<String, RendererError>;

    /// Render `job.matrix` to `job.output` with the job's bounds, height
    /// and pass-through flags.
    fn render(&self, job: &RenderJob) -> Result<(), RendererError>;
}

