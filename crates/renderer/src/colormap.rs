//! Colormaps: piecewise-linear color ramps over the normalized range `[0, 1]`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::gradient::{interpolate_color, Color};
use crate::{RenderError, RenderResult};

/// Colormap used when none is requested
pub const DEFAULT_COLORMAP: &str = "RdYlBu";

/// Colormap definition as stored in JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorMapDefinition {
    pub name: String,
    pub description: Option<String>,
    pub stops: Vec<ColorStop>,
}

/// Color stop for a ramp
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    /// Position in `[0, 1]`
    pub value: f32,
    pub color: String,
}

/// A validated colormap ready for lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    name: String,
    /// Sorted by position, at least two entries
    stops: Vec<(f32, Color)>,
}

const BUILTIN: &[(&str, &[(f32, &str)])] = &[
    (
        "RdYlBu",
        &[(0.0, "#a50026"), (0.25, "#f46d43"), (0.5, "#ffffbf"), (0.75, "#74add1"), (1.0, "#313695")],
    ),
    ("Reds", &[(0.0, "#fff5f0"), (0.5, "#fb6a4a"), (1.0, "#67000d")]),
    ("Blues", &[(0.0, "#f7fbff"), (0.5, "#6baed6"), (1.0, "#08306b")]),
    ("Greys", &[(0.0, "#ffffff"), (1.0, "#000000")]),
    (
        "viridis",
        &[(0.0, "#440154"), (0.25, "#3b528b"), (0.5, "#21918c"), (0.75, "#5ec962"), (1.0, "#fde725")],
    ),
    ("hot", &[(0.0, "#0b0000"), (0.375, "#ff0000"), (0.75, "#ffff00"), (1.0, "#ffffff")]),
];

impl ColorMap {
    /// Build a colormap from stops, validating positions and colors.
    pub fn new(name: &str, stops: &[ColorStop]) -> RenderResult<Self> {
        if stops.len() < 2 {
            return Err(RenderError::InvalidColorMap(format!(
                "'{}' needs at least two stops",
                name
            )));
        }

        let mut parsed = Vec::with_capacity(stops.len());
        for stop in stops {
            if !(0.0..=1.0).contains(&stop.value) {
                return Err(RenderError::InvalidColorMap(format!(
                    "'{}' stop {} is outside [0, 1]",
                    name, stop.value
                )));
            }
            let color = Color::parse(&stop.color)
                .ok_or_else(|| RenderError::InvalidColor(stop.color.clone()))?;
            parsed.push((stop.value, color));
        }
        parsed.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Self {
            name: name.to_string(),
            stops: parsed,
        })
    }

    /// Look up a built-in colormap. A `_r` suffix reverses it.
    pub fn builtin(name: &str) -> Option<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };

        let (_, stops) = BUILTIN.iter().find(|(n, _)| *n == base)?;
        let mut stops: Vec<(f32, Color)> = stops
            .iter()
            .filter_map(|(v, hex)| Color::parse(hex).map(|c| (*v, c)))
            .collect();
        if reversed {
            stops = stops.into_iter().rev().map(|(v, c)| (1.0 - v, c)).collect();
        }

        Some(Self {
            name: name.to_string(),
            stops,
        })
    }

    /// Names accepted by [`ColorMap::builtin`], without `_r` variants.
    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(n, _)| *n)
    }

    /// Load colormap definition from JSON string
    pub fn from_json(json_str: &str) -> RenderResult<Self> {
        let def: ColorMapDefinition = serde_json::from_str(json_str)
            .map_err(|e| RenderError::InvalidColorMap(e.to_string()))?;
        Self::new(&def.name, &def.stops)
    }

    /// Load colormap definition from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Resolve a `--colorMap` argument: a built-in name, or a path to a
    /// JSON definition.
    pub fn resolve(spec: &str) -> RenderResult<Self> {
        if let Some(map) = Self::builtin(spec) {
            return Ok(map);
        }
        if spec.ends_with(".json") {
            return Self::from_file(spec);
        }
        Err(RenderError::InvalidColorMap(format!(
            "unknown colormap '{}' (built-in: {})",
            spec,
            Self::builtin_names().collect::<Vec<_>>().join(", ")
        )))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color at normalized position `t`, clamped to the end stops.
    pub fn color_at(&self, t: f64) -> Color {
        let t = t as f32;
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for pair in self.stops.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if t <= high.0 {
                let span = high.0 - low.0;
                if span <= f32::EPSILON {
                    return high.1;
                }
                return interpolate_color(low.1, high.1, (t - low.0) / span);
            }
        }
        last.1
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::builtin(DEFAULT_COLORMAP).unwrap_or_else(|| Self {
            name: "Greys".to_string(),
            stops: vec![(0.0, Color::WHITE), (1.0, Color::BLACK)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtins_parse() {
        for name in ColorMap::builtin_names() {
            let map = ColorMap::builtin(name).unwrap();
            assert!(map.stops.len() >= 2, "{} lost stops", name);
        }
    }

    #[test]
    fn test_endpoints_and_clamping() {
        let map = ColorMap::builtin("Greys").unwrap();
        assert_eq!(map.color_at(0.0), Color::WHITE);
        assert_eq!(map.color_at(1.0), Color::BLACK);
        assert_eq!(map.color_at(-3.0), Color::WHITE);
        assert_eq!(map.color_at(7.0), Color::BLACK);
        assert_eq!(map.color_at(0.5), Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_reversed_builtin() {
        let forward = ColorMap::builtin("RdYlBu").unwrap();
        let reversed = ColorMap::builtin("RdYlBu_r").unwrap();
        assert_eq!(forward.color_at(0.0), reversed.color_at(1.0));
        assert_eq!(forward.color_at(1.0), reversed.color_at(0.0));
        assert_eq!(reversed.name(), "RdYlBu_r");
    }

    #[test]
    fn test_from_json_sorts_stops() {
        let map = ColorMap::from_json(
            r##"{"name":"custom","stops":[{"value":1.0,"color":"#ff0000"},{"value":0.0,"color":"#0000ff"}]}"##,
        )
        .unwrap();
        assert_eq!(map.color_at(0.0), Color::rgb(0, 0, 255));
        assert_eq!(map.color_at(1.0), Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_invalid_definitions() {
        let one_stop = r##"{"name":"x","stops":[{"value":0.0,"color":"#000000"}]}"##;
        assert!(matches!(ColorMap::from_json(one_stop), Err(RenderError::InvalidColorMap(_))));

        let bad_color = r##"{"name":"x","stops":[{"value":0.0,"color":"nope"},{"value":1.0,"color":"#000000"}]}"##;
        assert!(matches!(ColorMap::from_json(bad_color), Err(RenderError::InvalidColor(_))));

        let out_of_range = r##"{"name":"x","stops":[{"value":0.0,"color":"#000000"},{"value":2.0,"color":"#000000"}]}"##;
        assert!(matches!(ColorMap::from_json(out_of_range), Err(RenderError::InvalidColorMap(_))));
    }

    #[test]
    fn test_resolve_unknown_name() {
        let err = ColorMap::resolve("jet").unwrap_err();
        assert!(err.to_string().contains("RdYlBu"));
    }
}
