//! Heatmap image rendering for region-by-bin score matrices.
//!
//! Implements:
//! - Colormaps (built-in and JSON defined)
//! - Gradient rendering of value grids with a missing-data colour
//! - Heatmap layout: region sorting, group stacking, physical sizing
//! - PNG (indexed or RGBA) and SVG encoding

pub mod colormap;
pub mod error;
pub mod gradient;
pub mod heatmap;
pub mod png;
pub mod svg;

pub use colormap::ColorMap;
pub use error::{RenderError, RenderResult};
pub use gradient::Color;
pub use heatmap::{HeatmapOptions, ImageFormat, SortOrder, SortUsing};
