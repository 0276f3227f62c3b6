//! Heatmap layout and output.
//!
//! Groups are stacked top to bottom in file order with a one-row
//! separator band between them. Rows are sorted inside each group, then
//! the stacked grid is resampled onto the pixel canvas whose size comes
//! from the physical height and width (cm) and the resolution (dpi).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use matrix_reader::{HeatmapMatrix, RegionGroup};
use tracing::debug;

use crate::colormap::ColorMap;
use crate::gradient::{nearest_index, render_grid, resample_nearest, Color};
use crate::{png, svg, RenderError, RenderResult};

pub const CM_PER_INCH: f64 = 2.54;

/// Image formats a batch may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Pdf,
    Eps,
    Svg,
    Emf,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 5] = [
        ImageFormat::Png,
        ImageFormat::Pdf,
        ImageFormat::Eps,
        ImageFormat::Svg,
        ImageFormat::Emf,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Pdf => "pdf",
            ImageFormat::Eps => "eps",
            ImageFormat::Svg => "svg",
            ImageFormat::Emf => "emf",
        }
    }

    /// Whether this crate can encode the format itself.
    pub fn is_native(&self) -> bool {
        matches!(self, ImageFormat::Png | ImageFormat::Svg)
    }

    /// Format implied by an output file extension.
    pub fn from_path(path: &Path) -> RenderResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| RenderError::UnsupportedFormat(path.display().to_string()))?;
        ext.parse()
    }
}

impl FromStr for ImageFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == lower)
            .ok_or_else(|| RenderError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Row order inside each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
    /// Keep file order
    Keep,
}

impl FromStr for SortOrder {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "descending" => Ok(SortOrder::Descending),
            "ascending" => Ok(SortOrder::Ascending),
            "no" => Ok(SortOrder::Keep),
            other => Err(RenderError::InvalidOptions(format!(
                "unknown sort order '{}'",
                other
            ))),
        }
    }
}

/// Row statistic used as the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortUsing {
    #[default]
    Mean,
    Median,
    Max,
    Min,
    Sum,
}

impl FromStr for SortUsing {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(SortUsing::Mean),
            "median" => Ok(SortUsing::Median),
            "max" => Ok(SortUsing::Max),
            "min" => Ok(SortUsing::Min),
            "sum" => Ok(SortUsing::Sum),
            other => Err(RenderError::InvalidOptions(format!(
                "unknown sort statistic '{}'",
                other
            ))),
        }
    }
}

/// Everything that controls how one heatmap looks.
#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    /// Lower end of the color scale; data minimum when unset
    pub z_min: Option<f64>,
    /// Upper end of the color scale; data maximum when unset
    pub z_max: Option<f64>,
    pub height_cm: f64,
    pub width_cm: f64,
    pub dpi: f64,
    pub colormap: ColorMap,
    pub missing_color: Color,
    pub separator_color: Color,
    pub sort_order: SortOrder,
    pub sort_using: SortUsing,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            z_min: None,
            z_max: None,
            height_cm: 25.0,
            width_cm: 7.5,
            dpi: 100.0,
            colormap: ColorMap::default(),
            missing_color: Color::BLACK,
            separator_color: Color::WHITE,
            sort_order: SortOrder::Descending,
            sort_using: SortUsing::Mean,
        }
    }
}

impl HeatmapOptions {
    fn validate(&self) -> RenderResult<()> {
        for (name, value) in [
            ("heatmapHeight", self.height_cm),
            ("heatmapWidth", self.width_cm),
            ("dpi", self.dpi),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RenderError::InvalidOptions(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if let (Some(lo), Some(hi)) = (self.z_min, self.z_max) {
            if lo > hi {
                return Err(RenderError::InvalidOptions(format!(
                    "zMin {} is greater than zMax {}",
                    lo, hi
                )));
            }
        }
        Ok(())
    }
}

/// An RGBA image in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

/// Convert a physical length to pixels, never less than one.
pub fn cm_to_pixels(cm: f64, dpi: f64) -> usize {
    (cm / CM_PER_INCH * dpi).round().max(1.0) as usize
}

/// Render a parsed matrix to an RGBA raster.
pub fn render_heatmap(matrix: &HeatmapMatrix, options: &HeatmapOptions) -> RenderResult<Raster> {
    options.validate()?;

    let cols = matrix.num_cols();
    if cols == 0 {
        return Err(RenderError::InvalidOptions(
            "matrix has no score columns".to_string(),
        ));
    }

    let (z_min, z_max) = color_range(matrix, options);
    if z_min > z_max {
        return Err(RenderError::InvalidOptions(format!(
            "zMin {} is greater than zMax {}",
            z_min, z_max
        )));
    }

    // Stacked source grid, separator rows marked
    let groups = matrix.groups();
    let mut grid = Vec::with_capacity((matrix.num_regions() + groups.len()) * cols);
    let mut is_separator = Vec::with_capacity(matrix.num_regions() + groups.len());
    for (i, group) in groups.iter().enumerate() {
        for row in sorted_rows(group, options.sort_order, options.sort_using) {
            grid.extend_from_slice(group.row(row));
            is_separator.push(false);
        }
        if i + 1 < groups.len() {
            grid.extend(std::iter::repeat(f64::NAN).take(cols));
            is_separator.push(true);
        }
    }
    let src_rows = is_separator.len();

    let width = cm_to_pixels(options.width_cm, options.dpi);
    let height = cm_to_pixels(options.height_cm, options.dpi);

    let resampled = resample_nearest(&grid, cols, src_rows, width, height);
    let mut pixels = render_grid(
        &resampled,
        width,
        height,
        z_min,
        z_max,
        options.missing_color,
        |t| options.colormap.color_at(t),
    );

    let band = options.separator_color;
    for y in 0..height {
        if is_separator[nearest_index(y, height, src_rows)] {
            for px in pixels[y * width * 4..(y + 1) * width * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&[band.r, band.g, band.b, band.a]);
            }
        }
    }

    debug!(
        width,
        height,
        regions = matrix.num_regions(),
        z_min,
        z_max,
        colormap = options.colormap.name(),
        "Rendered heatmap"
    );

    Ok(Raster {
        width,
        height,
        pixels,
    })
}

/// Encode a raster in the requested format.
pub fn encode(raster: &Raster, format: ImageFormat) -> RenderResult<Vec<u8>> {
    match format {
        ImageFormat::Png => png::create_png_auto(&raster.pixels, raster.width, raster.height)
            .map_err(RenderError::Encode),
        ImageFormat::Svg => svg::create_svg(&raster.pixels, raster.width, raster.height)
            .map(String::into_bytes)
            .map_err(RenderError::Encode),
        other => Err(RenderError::UnsupportedFormat(other.to_string())),
    }
}

/// Read `matrix_path`, render it and write the image to `output_path`.
///
/// The format comes from the output extension and is checked before the
/// matrix is read.
pub fn write_heatmap(
    matrix_path: &Path,
    output_path: &Path,
    options: &HeatmapOptions,
) -> RenderResult<()> {
    let format = ImageFormat::from_path(output_path)?;
    if !format.is_native() {
        return Err(RenderError::UnsupportedFormat(format.to_string()));
    }

    let matrix = HeatmapMatrix::from_path(matrix_path)?;
    let raster = render_heatmap(&matrix, options)?;
    let bytes = encode(&raster, format)?;
    std::fs::write(output_path, &bytes)?;

    debug!(
        output = %output_path.display(),
        bytes = bytes.len(),
        "Wrote heatmap"
    );
    Ok(())
}

/// Requested bounds, falling back to the finite data range.
fn color_range(matrix: &HeatmapMatrix, options: &HeatmapOptions) -> (f64, f64) {
    let finite = matrix.flatten_finite();
    let data_min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let data_max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (data_min, data_max) = if finite.is_empty() {
        (0.0, 1.0)
    } else {
        (data_min, data_max)
    };
    (
        options.z_min.unwrap_or(data_min),
        options.z_max.unwrap_or(data_max),
    )
}

/// Row indices of `group` in display order.
fn sorted_rows(group: &RegionGroup, order: SortOrder, using: SortUsing) -> Vec<usize> {
    let mut rows: Vec<usize> = (0..group.rows()).collect();
    if order == SortOrder::Keep {
        return rows;
    }

    let keys: Vec<f64> = rows.iter().map(|&r| row_statistic(group.row(r), using)).collect();
    // Stable: ties keep file order. Rows without data go last either way.
    rows.sort_by(|&a, &b| {
        let (ka, kb) = (keys[a], keys[b]);
        match (ka.is_nan(), kb.is_nan()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => match order {
                SortOrder::Ascending => ka.total_cmp(&kb),
                _ => kb.total_cmp(&ka),
            },
        }
    });
    rows
}

/// Statistic over the finite values of a row; NaN when there are none.
fn row_statistic(row: &[f64], using: SortUsing) -> f64 {
    let mut values: Vec<f64> = row.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return f64::NAN;
    }
    match using {
        SortUsing::Mean => values.iter().sum::<f64>() / values.len() as f64,
        SortUsing::Sum => values.iter().sum(),
        SortUsing::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        SortUsing::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        SortUsing::Median => {
            values.sort_by(f64::total_cmp);
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2.0
            } else {
                values[mid]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn matrix(content: &str) -> HeatmapMatrix {
        HeatmapMatrix::from_reader(Cursor::new(content), Path::new("test")).unwrap()
    }

    fn greys() -> HeatmapOptions {
        HeatmapOptions {
            colormap: ColorMap::builtin("Greys").unwrap(),
            // 1 cm at 2.54 dpi is exactly one pixel
            dpi: CM_PER_INCH,
            ..HeatmapOptions::default()
        }
    }

    #[test]
    fn test_cm_to_pixels() {
        assert_eq!(cm_to_pixels(2.54, 100.0), 100);
        assert_eq!(cm_to_pixels(25.0, 100.0), 984);
        assert_eq!(cm_to_pixels(0.001, 1.0), 1);
    }

    #[test]
    fn test_image_format_parsing() {
        assert_eq!("PNG".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!(
            ImageFormat::from_path(Path::new("out/a.b.svg")).unwrap(),
            ImageFormat::Svg
        );
        assert!(ImageFormat::from_path(Path::new("noext")).is_err());
        assert!("tiff".parse::<ImageFormat>().is_err());
        assert!(!ImageFormat::Pdf.is_native());
    }

    #[test]
    fn test_row_statistics() {
        let row = [1.0, f64::NAN, 3.0, 8.0];
        assert_eq!(row_statistic(&row, SortUsing::Mean), 4.0);
        assert_eq!(row_statistic(&row, SortUsing::Median), 3.0);
        assert_eq!(row_statistic(&row, SortUsing::Max), 8.0);
        assert_eq!(row_statistic(&row, SortUsing::Min), 1.0);
        assert_eq!(row_statistic(&row, SortUsing::Sum), 12.0);
        assert_eq!(row_statistic(&[2.0, 4.0], SortUsing::Median), 3.0);
        assert!(row_statistic(&[f64::NAN], SortUsing::Mean).is_nan());
    }

    #[test]
    fn test_sort_descending_puts_empty_rows_last() {
        let m = matrix(
            "c\t0\t1\ta\t.\t+\t1\n\
             c\t1\t2\tb\t.\t+\tnan\n\
             c\t2\t3\tc\t.\t+\t5\n\
             c\t3\t4\td\t.\t+\t3\n",
        );
        let group = &m.groups()[0];
        assert_eq!(sorted_rows(group, SortOrder::Descending, SortUsing::Mean), vec![2, 3, 0, 1]);
        assert_eq!(sorted_rows(group, SortOrder::Ascending, SortUsing::Mean), vec![0, 3, 2, 1]);
        assert_eq!(sorted_rows(group, SortOrder::Keep, SortUsing::Mean), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_render_one_pixel_per_cell() {
        let m = matrix("c\t0\t1\ta\t.\t+\t0\t10\nc\t1\t2\tb\t.\t+\t5\tnan\n");
        let options = HeatmapOptions {
            z_min: Some(0.0),
            z_max: Some(10.0),
            height_cm: 2.0,
            width_cm: 2.0,
            sort_order: SortOrder::Keep,
            ..greys()
        };

        let raster = render_heatmap(&m, &options).unwrap();
        assert_eq!((raster.width, raster.height), (2, 2));
        let px = |x: usize, y: usize| {
            let i = (y * 2 + x) * 4;
            raster.pixels[i..i + 4].to_vec()
        };
        assert_eq!(px(0, 0), vec![255, 255, 255, 255]);
        assert_eq!(px(1, 0), vec![0, 0, 0, 255]);
        assert_eq!(px(0, 1), vec![128, 128, 128, 255]);
        // missing data color
        assert_eq!(px(1, 1), vec![0, 0, 0, 255]);
    }

    #[test]
    fn test_group_separator_band() {
        let content = "@{\"group_labels\":[\"a\",\"b\"],\"group_boundaries\":[0,1,2]}\n\
            c\t0\t1\tr1\t.\t+\t0\n\
            c\t1\t2\tr2\t.\t+\t0\n";
        let options = HeatmapOptions {
            z_min: Some(0.0),
            z_max: Some(1.0),
            height_cm: 3.0,
            width_cm: 1.0,
            separator_color: Color::rgb(255, 0, 0),
            ..greys()
        };

        let raster = render_heatmap(&matrix(content), &options).unwrap();
        assert_eq!(raster.height, 3);
        assert_eq!(&raster.pixels[0..4], &[255, 255, 255, 255]);
        assert_eq!(&raster.pixels[4..8], &[255, 0, 0, 255]);
        assert_eq!(&raster.pixels[8..12], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let m = matrix("c\t0\t1\ta\t.\t+\t1\n");
        let options = HeatmapOptions {
            z_min: Some(2.0),
            z_max: Some(1.0),
            ..greys()
        };
        assert!(matches!(
            render_heatmap(&m, &options),
            Err(RenderError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_encode_unsupported_format() {
        let raster = Raster {
            width: 1,
            height: 1,
            pixels: vec![0, 0, 0, 255],
        };
        assert!(matches!(
            encode(&raster, ImageFormat::Eps),
            Err(RenderError::UnsupportedFormat(_))
        ));
        assert!(encode(&raster, ImageFormat::Svg).is_ok());
    }
}
