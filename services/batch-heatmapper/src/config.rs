//! Batch configuration built once from the command line.

use std::collections::HashSet;
use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use renderer::ImageFormat;
use tracing::warn;

use crate::args::{Args, RendererKind};
use crate::render::{CommandRenderer, HeatmapRenderer, NativeRenderer};
use crate::{BatchError, BatchResult};

/// Which renderer draws the heatmaps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RendererBackend {
    #[default]
    Native,
    Command {
        program: PathBuf,
    },
}

impl RendererBackend {
    pub fn from_args(args: &Args) -> Self {
        match args.renderer {
            RendererKind::Native => RendererBackend::Native,
            RendererKind::Command => RendererBackend::Command {
                program: args.renderer_bin.clone(),
            },
        }
    }

    pub fn build(&self) -> Box<dyn HeatmapRenderer> {
        match self {
            RendererBackend::Native => Box::new(NativeRenderer),
            RendererBackend::Command { program } => Box::new(CommandRenderer::new(program.clone())),
        }
    }
}

/// Everything a batch run needs, shared read-only by every phase.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub files: Vec<PathBuf>,
    pub z_min: Option<f64>,
    pub z_max: Option<f64>,
    pub format: ImageFormat,
    pub prefix: String,
    pub suffix: String,
    pub workers: NonZeroUsize,
    pub pass_through: Vec<OsString>,
    pub renderer: RendererBackend,
}

impl BatchConfig {
    /// Defaults for `files`: estimated bounds, png, one worker.
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            z_min: None,
            z_max: None,
            format: ImageFormat::Png,
            prefix: String::new(),
            suffix: String::new(),
            workers: NonZeroUsize::MIN,
            pass_through: Vec::new(),
            renderer: RendererBackend::Native,
        }
    }

    pub fn from_args(args: &Args) -> BatchResult<Self> {
        let mut seen = HashSet::new();
        let mut files = Vec::with_capacity(args.files.len());
        for file in &args.files {
            if seen.insert(file.clone()) {
                files.push(file.clone());
            } else {
                warn!(path = %file.display(), "Ignoring duplicate input file");
            }
        }
        if files.is_empty() {
            return Err(BatchError::NoInputFiles);
        }

        for (flag, value) in [("zMin", args.z_min), ("zMax", args.z_max)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(BatchError::InvalidArgument(format!(
                        "--{} must be finite, got {}",
                        flag, v
                    )));
                }
            }
        }

        let format: ImageFormat = args
            .ext
            .parse()
            .map_err(|_| BatchError::InvalidArgument(format!("unknown image format '{}'", args.ext)))?;

        Ok(Self {
            files,
            z_min: args.z_min,
            z_max: args.z_max,
            format,
            prefix: args.prefix.clone(),
            suffix: args.suffix.clone(),
            workers: args.processes,
            pass_through: args.pass_through.clone(),
            renderer: RendererBackend::from_args(args),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_argv(std::iter::once("batch-heatmapper").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = BatchConfig::from_args(&args(&["-f", "a.gz"])).unwrap();
        assert_eq!(config.files, vec![PathBuf::from("a.gz")]);
        assert_eq!(config.format, ImageFormat::Png);
        assert_eq!(config.workers.get(), 1);
        assert_eq!(config.renderer, RendererBackend::Native);
        assert!(config.z_min.is_none() && config.z_max.is_none());
    }

    #[test]
    fn test_duplicates_removed_in_order() {
        let config = BatchConfig::from_args(&args(&["-f", "b.gz", "a.gz", "b.gz"])).unwrap();
        assert_eq!(config.files, vec![PathBuf::from("b.gz"), PathBuf::from("a.gz")]);
    }

    #[test]
    fn test_no_files() {
        let parsed = args(&["-hh"]);
        assert!(matches!(BatchConfig::from_args(&parsed), Err(BatchError::NoInputFiles)));
    }

    #[test]
    fn test_non_finite_bound_rejected() {
        let parsed = args(&["-f", "a.gz", "--zMax", "inf"]);
        assert!(matches!(
            BatchConfig::from_args(&parsed),
            Err(BatchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_command_backend() {
        let parsed = args(&["-f", "a.gz", "--renderer", "command", "--renderer-bin", "/opt/hm"]);
        let config = BatchConfig::from_args(&parsed).unwrap();
        assert_eq!(
            config.renderer,
            RendererBackend::Command {
                program: PathBuf::from("/opt/hm")
            }
        );
        assert_eq!(config.renderer.build().name(), "command");
    }
}
