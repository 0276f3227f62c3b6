//! Command-line arguments.

use std::collections::HashSet;
use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};

use crate::config::RendererBackend;
use crate::{BatchError, BatchResult};

/// Renderer backend selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererKind {
    /// Render in-process
    Native,
    /// Run an external heatmapper program per file
    Command,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "batch-heatmapper")]
#[command(about = "Render heatmaps for many score matrices with shared color bounds")]
#[command(
    after_help = "Flags after -hf are handed to the renderer unchanged; -hf must come last."
)]
pub struct Args {
    /// Matrix files to plot
    #[arg(short = 'f', long = "files", num_args = 1.., required_unless_present = "renderer_help")]
    pub files: Vec<PathBuf>,

    /// Upper color bound; estimated from the 98th percentile when unset
    #[arg(long = "zMax", allow_negative_numbers = true)]
    pub z_max: Option<f64>,

    /// Lower color bound; estimated from the 1st percentile when unset
    #[arg(long = "zMin", allow_negative_numbers = true)]
    pub z_min: Option<f64>,

    /// Image format of the heatmaps
    #[arg(long, default_value = "png", value_parser = ["png", "pdf", "eps", "svg", "emf"])]
    pub ext: String,

    /// Prepended to every output file name
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub prefix: String,

    /// Appended to every output stem before the extension
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub suffix: String,

    /// Number of worker threads
    #[arg(short = 'p', default_value = "1")]
    pub processes: NonZeroUsize,

    /// Print this help followed by the renderer's help (-hh)
    #[arg(long = "hh")]
    pub renderer_help: bool,

    /// Flags passed verbatim to the renderer (-hf)
    #[arg(long = "hf", num_args = 1.., allow_hyphen_values = true)]
    pub pass_through: Vec<OsString>,

    /// Renderer backend
    #[arg(long, value_enum, default_value_t = RendererKind::Native)]
    pub renderer: RendererKind,

    /// Heatmapper program for the command backend
    #[arg(long, env = "HEATMAPPER_BIN", default_value = "heatmapper")]
    pub renderer_bin: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    /// Parse `argv`, accepting the single-dash `-hh` and `-hf` spellings.
    ///
    /// Everything after the first `-hf` is pass-through, whatever it looks
    /// like. A token in value position of an option (`--prefix -hh`) is
    /// left alone.
    pub fn try_parse_argv<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let takes_value = Self::value_options();
        let mut iter = argv.into_iter().map(Into::<OsString>::into);
        let mut head: Vec<OsString> = iter.next().into_iter().collect();
        let mut tail: Option<Vec<OsString>> = None;

        while let Some(arg) = iter.next() {
            if arg == "-hf" || arg == "--hf" {
                tail = Some(iter.by_ref().collect());
                break;
            }
            let expects_value = arg.to_str().is_some_and(|a| takes_value.contains(a));
            head.push(if arg == "-hh" { OsString::from("--hh") } else { arg });
            if expects_value {
                head.extend(iter.next());
            }
        }

        let mut args = Self::try_parse_from(head)?;
        if let Some(tail) = tail {
            args.pass_through = tail;
        }
        Ok(args)
    }

    pub fn parse_argv() -> Self {
        Self::try_parse_argv(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Spellings of every option that consumes the following token.
    fn value_options() -> HashSet<String> {
        Self::command()
            .get_arguments()
            .filter(|arg| arg.get_action().takes_values())
            .flat_map(|arg| {
                let long = arg.get_long().map(|l| format!("--{}", l));
                let short = arg.get_short().map(|c| format!("-{}", c));
                long.into_iter().chain(short)
            })
            .collect()
    }
}

/// This tool's own help.
pub fn usage() -> String {
    Args::command().render_help().to_string()
}

/// Help of the renderer `args` selects.
pub fn renderer_help(args: &Args) -> BatchResult<String> {
    RendererBackend::from_args(args)
        .build()
        .help()
        .map_err(BatchError::RendererHelp)
}
