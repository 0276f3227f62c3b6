//! In-process renderer built on the `renderer` crate.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use renderer::heatmap::write_heatmap;
use renderer::{Color, ColorMap, HeatmapOptions, RenderError, SortOrder, SortUsing};
use tracing::debug;

use super::{HeatmapRenderer, RendererError};
use crate::dispatch::RenderJob;

/// Command line of the heatmap renderer.
///
/// Pass-through flags of a batch are parsed with this, so repeating a flag
/// keeps the last value.
#[derive(Parser, Debug, Clone)]
#[command(name = "heatmapper")]
#[command(about = "Draw a heatmap from a computed score matrix")]
#[command(args_override_self = true)]
pub struct HeatmapperArgs {
    /// Matrix file, gzip or plain
    #[arg(short = 'm', long = "matrixFile")]
    pub matrix_file: PathBuf,

    /// Output image; the extension picks the format
    #[arg(short = 'o', long = "outFileName")]
    pub out_file_name: PathBuf,

    /// Lowest value of the color scale
    #[arg(long = "zMin", allow_negative_numbers = true)]
    pub z_min: Option<f64>,

    /// Highest value of the color scale
    #[arg(long = "zMax", allow_negative_numbers = true)]
    pub z_max: Option<f64>,

    /// Heatmap height in cm
    #[arg(long = "heatmapHeight", default_value_t = 25.0)]
    pub heatmap_height: f64,

    /// Heatmap width in cm
    #[arg(long = "heatmapWidth", default_value_t = 7.5)]
    pub heatmap_width: f64,

    /// Output resolution
    #[arg(long, default_value_t = 100.0)]
    pub dpi: f64,

    /// Built-in colormap name or a JSON colormap file
    #[arg(long = "colorMap", default_value = renderer::colormap::DEFAULT_COLORMAP)]
    pub color_map: String,

    /// Color for missing values
    #[arg(long = "missingDataColor", default_value = "black")]
    pub missing_data_color: String,

    /// Row order inside each group
    #[arg(long = "sortRegions", default_value = "descending",
          value_parser = ["descending", "ascending", "no"])]
    pub sort_regions: String,

    /// Row statistic to sort by
    #[arg(long = "sortUsing", default_value = "mean",
          value_parser = ["mean", "median", "max", "min", "sum"])]
    pub sort_using: String,
}

impl HeatmapperArgs {
    /// Parse the pass-through flags followed by the matrix and output, then apply the
    /// job's bounds and height on top.
    pub fn for_job(job: &RenderJob) -> Result<Self, RendererError> {
        let mut argv: Vec<OsString> = Vec::with_capacity(job.extra_flags.len() + 5);
        argv.push("heatmapper".into());
        argv.extend(job.extra_flags.iter().cloned());
        argv.push("-m".into());
        argv.push(job.matrix.clone().into_os_string());
        argv.push("-o".into());
        argv.push(job.output.clone().into_os_string());

        let mut args = Self::try_parse_from(argv)?;
        args.z_min = Some(job.z_min);
        args.z_max = Some(job.z_max);
        args.heatmap_height = job.heatmap_height;
        Ok(args)
    }

    pub fn to_options(&self) -> Result<HeatmapOptions, RenderError> {
        let missing_color = Color::parse(&self.missing_data_color)
            .ok_or_else(|| RenderError::InvalidColor(self.missing_data_color.clone()))?;

        Ok(HeatmapOptions {
            z_min: self.z_min,
            z_max: self.z_max,
            height_cm: self.heatmap_height,
            width_cm: self.heatmap_width,
            dpi: self.dpi,
            colormap: ColorMap::resolve(&self.color_map)?,
            missing_color,
            sort_order: self.sort_regions.parse::<SortOrder>()?,
            sort_using: self.sort_using.parse::<SortUsing>()?,
            ..HeatmapOptions::default()
        })
    }
}

/// Renders in the calling worker thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeRenderer;

impl HeatmapRenderer for NativeRenderer {
    fn name(&self) -> &str {
        "native"
    }

    fn help(&self) -> Result<String, RendererError> {
        Ok(HeatmapperArgs::command().render_help().to_string())
    }

    fn render(&self, job: &RenderJob) -> Result<(), RendererError> {
        let args = HeatmapperArgs::for_job(job)?;
        let options = args.to_options()?;
        debug!(
            matrix = %args.matrix_file.display(),
            colormap = options.colormap.name(),
            "Rendering natively"
        );
        write_heatmap(&args.matrix_file, &args.out_file_name, &options)?;
        Ok(())
    }
}
