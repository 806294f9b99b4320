use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Colormaps for density images
// ---------------------------------------------------------------------------

/// Colormap used to shade Hess diagram cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMapName {
    /// Black (sparse) to white (dense).
    #[default]
    Gray,
    /// White (sparse) to black (dense).
    GrayR,
    /// Blue through green to red.
    Heat,
}

impl FromStr for ColorMapName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(ColorMapName::Gray),
            "gray_r" | "grey_r" => Ok(ColorMapName::GrayR),
            "heat" => Ok(ColorMapName::Heat),
            other => Err(format!("unknown colormap '{other}'")),
        }
    }
}

impl ColorMapName {
    /// Colour at position `t` in `[0, 1]`; out-of-range `t` is clamped.
    pub fn sample(self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = t as f32;
        let rgb: Srgb = match self {
            ColorMapName::Gray => Srgb::new(t, t, t),
            ColorMapName::GrayR => Srgb::new(1.0 - t, 1.0 - t, 1.0 - t),
            ColorMapName::Heat => {
                let hsl = Hsl::new((1.0 - t) * 240.0, 0.85, 0.5);
                hsl.into_color()
            }
        };
        to_rgb(rgb)
    }
}

fn to_rgb(c: Srgb) -> RGBColor {
    let c: Srgb<u8> = c.into_format();
    RGBColor(c.red, c.green, c.blue)
}

/// Convert a style colour triple.
pub fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

// ---------------------------------------------------------------------------
// Logarithmic normalization
// ---------------------------------------------------------------------------

/// Maps positive counts onto `[0, 1]` on a log scale.
///
/// Non-positive counts are masked (`None`) and drawn with the background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNorm {
    pub vmin: f64,
    pub vmax: f64,
}

impl LogNorm {
    /// Bounds default to the smallest positive and the largest count.
    pub fn for_counts(counts: &[u64], vmin: Option<f64>, vmax: Option<f64>) -> Self {
        let positive = counts.iter().copied().filter(|&c| c > 0);
        let data_min = positive.clone().min().unwrap_or(1) as f64;
        let data_max = positive.max().unwrap_or(1) as f64;
        LogNorm {
            vmin: vmin.filter(|v| *v > 0.0).unwrap_or(data_min),
            vmax: vmax.filter(|v| *v > 0.0).unwrap_or(data_max),
        }
    }

    pub fn normalize(&self, value: f64) -> Option<f64> {
        if value <= 0.0 || value.is_nan() {
            return None;
        }
        let (lo, hi) = (self.vmin.ln(), self.vmax.ln());
        if hi <= lo {
            return Some(0.0);
        }
        Some(((value.ln() - lo) / (hi - lo)).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gray_endpoints() {
        assert_eq!(ColorMapName::Gray.sample(0.0), RGBColor(0, 0, 0));
        assert_eq!(ColorMapName::Gray.sample(1.0), RGBColor(255, 255, 255));
        assert_eq!(ColorMapName::GrayR.sample(1.0), RGBColor(0, 0, 0));
        assert_eq!(ColorMapName::Gray.sample(7.0), RGBColor(255, 255, 255));
    }

    #[test]
    fn heat_runs_blue_to_red() {
        let cold = ColorMapName::Heat.sample(0.0);
        let hot = ColorMapName::Heat.sample(1.0);
        assert!(cold.2 > cold.0);
        assert!(hot.0 > hot.2);
    }

    #[test]
    fn colormap_names_parse() {
        assert_eq!("GREY_R".parse::<ColorMapName>().unwrap(), ColorMapName::GrayR);
        assert!("viridis".parse::<ColorMapName>().is_err());
    }

    #[test]
    fn log_norm_masks_empty_cells() {
        let norm = LogNorm::for_counts(&[0, 1, 10, 100], None, None);
        assert_eq!(norm.vmin, 1.0);
        assert_eq!(norm.vmax, 100.0);
        assert_eq!(norm.normalize(0.0), None);
        assert_relative_eq!(norm.normalize(10.0).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(norm.normalize(1000.0).unwrap(), 1.0);
    }

    #[test]
    fn log_norm_explicit_bounds_and_flat_grid() {
        let norm = LogNorm::for_counts(&[5, 5], Some(2.0), None);
        assert_eq!(norm.vmin, 2.0);
        assert_eq!(norm.vmax, 5.0);

        let flat = LogNorm::for_counts(&[3, 3], None, None);
        assert_eq!(flat.normalize(3.0), Some(0.0));
    }
}
