//! SVG encoding of RGBA rasters.
//!
//! Each horizontal run of identical pixels becomes one `rect`, which keeps
//! heatmaps (long runs after nearest-neighbour upscaling) compact.

use std::fmt::Write;

use crate::gradient::Color;

/// Encode RGBA pixel data as an SVG document.
pub fn create_svg(pixels: &[u8], width: usize, height: usize) -> Result<String, String> {
    if width == 0 || height == 0 {
        return Err(format!("empty image {}x{}", width, height));
    }
    if pixels.len() != width * height * 4 {
        return Err(format!(
            "pixel buffer has {} bytes, expected {} for {}x{}",
            pixels.len(),
            width * height * 4,
            width,
            height
        ));
    }

    let mut svg = String::with_capacity(128 + height * 64);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" shape-rendering="crispEdges">"#,
        w = width,
        h = height
    );

    for (y, row) in pixels.chunks_exact(width * 4).enumerate() {
        let mut x = 0;
        while x < width {
            let color = pixel(row, x);
            let mut end = x + 1;
            while end < width && pixel(row, end) == color {
                end += 1;
            }
            if color.a > 0 {
                write_rect(&mut svg, x, y, end - x, color);
            }
            x = end;
        }
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

fn pixel(row: &[u8], x: usize) -> Color {
    let p = &row[x * 4..x * 4 + 4];
    Color::new(p[0], p[1], p[2], p[3])
}

fn write_rect(svg: &mut String, x: usize, y: usize, run: usize, color: Color) {
    let _ = write!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="1" fill="{}""#,
        x,
        y,
        run,
        color.to_hex()
    );
    if color.a < 255 {
        let _ = write!(svg, r#" fill-opacity="{:.3}""#, color.a as f32 / 255.0);
    }
    svg.push_str("/>\n");
}
