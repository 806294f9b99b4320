use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::color::ColorMapName;

// ---------------------------------------------------------------------------
// PlotStyle – explicit rendering configuration
// ---------------------------------------------------------------------------

/// Everything the renderers need to know about appearance.
///
/// Built once (defaults, optionally overridden by a JSON file) and passed by
/// reference into each render call. Any field missing from the JSON keeps its
/// default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Image size in pixels.
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    /// Axis description font size.
    pub label_size: u32,
    /// Tick label font size.
    pub tick_size: u32,
    pub margin: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
    pub background: [u8; 3],
    /// CMD point radius.
    pub point_size: u32,
    pub point_color: [u8; 3],
    pub errorbar_color: [u8; 3],
    /// LF step line.
    pub line_color: [u8; 3],
    pub line_width: u32,
    pub colormap: ColorMapName,
    /// Width of the Hess colorbar strip, labels included.
    pub colorbar_width: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            font_family: "sans-serif".to_string(),
            label_size: 24,
            tick_size: 16,
            margin: 20,
            x_label_area: 60,
            y_label_area: 70,
            background: [255, 255, 255],
            point_size: 2,
            point_color: [0, 0, 0],
            errorbar_color: [128, 128, 128],
            line_color: [0, 0, 0],
            line_width: 3,
            colormap: ColorMapName::Gray,
            colorbar_width: 110,
        }
    }
}

impl PlotStyle {
    /// Read a style from a JSON file, e.g. `{"width": 1200, "colormap": "gray_r"}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading style file {}", path.display()))?;
        let style: PlotStyle = serde_json::from_str(&text)
            .with_context(|| format!("parsing style file {}", path.display()))?;
        anyhow::ensure!(
            style.width > 0 && style.height > 0,
            "style image size must be non-zero, got {}x{}",
            style.width,
            style.height
        );
        Ok(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"width": 1200, "colormap": "gray_r", "point_color": [255, 0, 0]}}"#).unwrap();

        let style = PlotStyle::from_json_file(file.path()).unwrap();
        assert_eq!(style.width, 1200);
        assert_eq!(style.height, PlotStyle::default().height);
        assert_eq!(style.colormap, ColorMapName::GrayR);
        assert_eq!(style.point_color, [255, 0, 0]);
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"height": 0}}"#).unwrap();
        assert!(PlotStyle::from_json_file(file.path()).is_err());
    }

    #[test]
    fn unknown_colormap_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"colormap": "jet"}}"#).unwrap();
        assert!(PlotStyle::from_json_file(file.path()).is_err());
    }
}
