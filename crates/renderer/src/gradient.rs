//! Gradient rendering of value grids.

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#rrggbb`, `#rrggbbaa` or a basic color name.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        match spec.to_ascii_lowercase().as_str() {
            "black" => return Some(Self::BLACK),
            "white" => return Some(Self::WHITE),
            "gray" | "grey" => return Some(Self::rgb(128, 128, 128)),
            "lightgray" | "lightgrey" => return Some(Self::rgb(211, 211, 211)),
            "red" => return Some(Self::rgb(255, 0, 0)),
            "green" => return Some(Self::rgb(0, 128, 0)),
            "blue" => return Some(Self::rgb(0, 0, 255)),
            "yellow" => return Some(Self::rgb(255, 255, 0)),
            "transparent" | "none" => return Some(Self::transparent()),
            _ => {}
        }

        let hex = spec.strip_prefix('#').unwrap_or(spec);
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// `#rrggbb` form, alpha ignored.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

/// Map a destination index to the nearest source index when a grid of
/// `src_len` cells is stretched or squeezed onto `dst_len` cells.
#[inline]
pub fn nearest_index(dst_index: usize, dst_len: usize, src_len: usize) -> usize {
    (dst_index * src_len / dst_len).min(src_len - 1)
}

/// Resample grid data to a different resolution using nearest-neighbour
/// sampling, so every output cell carries a value present in the input.
///
/// # Arguments
/// - `data`: Input grid data (row-major order)
/// - `src_width`, `src_height`: Source grid dimensions
/// - `dst_width`, `dst_height`: Destination grid dimensions
pub fn resample_nearest(
    data: &[f64],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f64> {
    if src_width == dst_width && src_height == dst_height {
        return data.to_vec();
    }
    if src_width == 0 || src_height == 0 {
        return vec![f64::NAN; dst_width * dst_height];
    }

    let columns: Vec<usize> = (0..dst_width)
        .map(|x| nearest_index(x, dst_width, src_width))
        .collect();

    let mut output = Vec::with_capacity(dst_width * dst_height);
    for y in 0..dst_height {
        let row_start = nearest_index(y, dst_height, src_height) * src_width;
        output.extend(columns.iter().map(|&col| data[row_start + col]));
    }
    output
}

/// Render grid data as a gradient heatmap
///
/// Values are scaled to `[0, 1]` over `min_val..max_val` and clamped, so
/// everything beyond the bounds takes the end colors. Non-finite values
/// are painted with `missing`.
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel)
pub fn render_grid<F>(
    data: &[f64],
    width: usize,
    height: usize,
    min_val: f64,
    max_val: f64,
    missing: Color,
    color_fn: F,
) -> Vec<u8>
where
    F: Fn(f64) -> Color,
{
    let mut pixels = vec![0u8; width * height * 4];

    let range = max_val - min_val;
    let range = if range.abs() < 1e-12 { 1.0 } else { range };

    for (idx, &value) in data.iter().take(width * height).enumerate() {
        let color = if value.is_finite() {
            color_fn(((value - min_val) / range).clamp(0.0, 1.0))
        } else {
            missing
        };

        let pixel_idx = idx * 4;
        pixels[pixel_idx] = color.r;
        pixels[pixel_idx + 1] = color.g;
        pixels[pixel_idx + 2] = color.b;
        pixels[pixel_idx + 3] = color.a;
    }

    pixels
}
