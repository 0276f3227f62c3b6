//! Renderer that runs an external heatmapper program once per job.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use super::{HeatmapRenderer, RendererError};
use crate::dispatch::RenderJob;

#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: PathBuf,
}

impl CommandRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// Arguments for one job: pass-through flags first, job values last.
    /// Paths go through as raw OS strings.
    pub fn command_args(job: &RenderJob) -> Vec<OsString> {
        let mut args = job.extra_flags.clone();
        args.extend([
            OsString::from("-m"),
            job.matrix.as_os_str().to_os_string(),
            OsString::from("-o"),
            job.output.as_os_str().to_os_string(),
            OsString::from("--zMin"),
            OsString::from(job.z_min.to_string()),
            OsString::from("--zMax"),
            OsString::from(job.z_max.to_string()),
            OsString::from("--heatmapHeight"),
            OsString::from(job.heatmap_height.to_string()),
        ]);
        args
    }

    fn run(&self, args: &[OsString]) -> Result<Vec<u8>, RendererError> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| RendererError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RendererError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl HeatmapRenderer for CommandRenderer {
    fn name(&self) -> &str {
        "command"
    }

    fn help(&self) -> Result<String, RendererError> {
        let stdout = self.run(&[OsString::from("--help")])?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn render(&self, job: &RenderJob) -> Result<(), RendererError> {
        let args = Self::command_args(job);
        debug!(program = %self.program.display(), ?args, "Spawning renderer");
        self.run(&args)?;
        Ok(())
    }
}
