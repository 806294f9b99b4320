use std::str::FromStr;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::binning::Histogram1D;
use crate::color::rgb;
use crate::style::PlotStyle;

use super::{build_chart, fill_background, Axis, AxisLabels, Figure, Limits, RenderError, Result};

/// Count axis scale for luminosity functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YScale {
    #[default]
    Log,
    Linear,
}

impl FromStr for YScale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "log" => Ok(YScale::Log),
            "linear" => Ok(YScale::Linear),
            other => Err(format!("unknown y scale '{other}' (expected log or linear)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Luminosity function (step histogram)
// ---------------------------------------------------------------------------

/// Magnitude histogram drawn as a step line.
pub struct LfFigure<'a> {
    pub lf: &'a Histogram1D,
    pub labels: AxisLabels,
    pub xlim: Option<Limits>,
    pub yscale: YScale,
}

impl LfFigure<'_> {
    fn axes(&self) -> Result<(Axis, Axis)> {
        let edges = &self.lf.edges;
        let (first, last) = match (edges.first(), edges.last()) {
            (Some(&a), Some(&b)) if b > a => (a, b),
            _ => return Err(RenderError::InvalidData("histogram has no bins".to_string())),
        };
        let x = self
            .xlim
            .unwrap_or_else(|| Limits::padded(&[first, last]).unwrap_or(Limits::new(first, last)));

        let peak = self.lf.counts.iter().copied().max().unwrap_or(0) as f64;
        let y = match self.yscale {
            // half a star keeps empty bins just below the visible range
            YScale::Log => Axis::log(Limits::new(0.5, (peak * 2.0).max(10.0))),
            YScale::Linear => Axis::linear(Limits::new(0.0, (peak * 1.05).max(1.0))).with_precision(0),
        };
        Ok((Axis::linear(x), y))
    }

    /// Corner points of the step outline, in data units.
    fn outline(&self) -> Vec<(f64, f64)> {
        let lf = self.lf;
        let mut pts = Vec::with_capacity(lf.counts.len() * 2);
        for (i, &count) in lf.counts.iter().enumerate() {
            pts.push((lf.edges[i], count as f64));
            pts.push((lf.edges[i + 1], count as f64));
        }
        pts
    }
}

impl Figure for LfFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> Result<()> {
        let (x, y) = self.axes()?;
        fill_background(root, style)?;
        let mut chart = build_chart(root, &x, &y, &self.labels, style)?;

        let floor = y.range().start;
        let points: Vec<(f64, f64)> = self
            .outline()
            .into_iter()
            .filter_map(|(m, n)| {
                let px = x.to_chart(m)?;
                let py = y.to_chart(n).unwrap_or(floor);
                Some((x.clamp(px), y.clamp(py)))
            })
            .collect();

        chart.draw_series(LineSeries::new(
            points,
            rgb(style.line_color).stroke_width(style.line_width),
        ))?;
        Ok(())
    }
}
