use plotters::coord::Shift;
use plotters::prelude::*;

use crate::color::rgb;
use crate::data::model::CmdData;
use crate::style::PlotStyle;

use super::{build_chart, fill_background, Axis, AxisLabels, Figure, Limits, RenderError, Result};

// ---------------------------------------------------------------------------
// Color-magnitude diagram (points with error bars)
// ---------------------------------------------------------------------------

/// Scatter plot of color against magnitude.
pub struct CmdFigure<'a> {
    pub data: &'a CmdData,
    pub labels: AxisLabels,
    pub xlim: Option<Limits>,
    /// Without explicit limits the magnitude axis is reversed.
    pub ylim: Option<Limits>,
    pub error_bars: bool,
}

impl CmdFigure<'_> {
    fn axes(&self) -> Result<(Axis, Axis)> {
        let x = self
            .xlim
            .or_else(|| Limits::padded(&self.data.color))
            .ok_or_else(|| RenderError::InvalidData("no points to plot".to_string()))?;
        let y = self
            .ylim
            .or_else(|| Limits::padded(&self.data.mag).map(Limits::reversed))
            .ok_or_else(|| RenderError::InvalidData("no points to plot".to_string()))?;
        Ok((Axis::linear(x), Axis::linear(y)))
    }
}

impl Figure for CmdFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> Result<()> {
        let (x, y) = self.axes()?;
        fill_background(root, style)?;
        let mut chart = build_chart(root, &x, &y, &self.labels, style)?;

        let d = self.data;
        let to_xy = |c: f64, m: f64| Some((x.to_chart(c)?, y.to_chart(m)?));

        if self.error_bars {
            let bar_style = rgb(style.errorbar_color).stroke_width(1);
            let segments = (0..d.len()).flat_map(|i| {
                let (c, m) = (d.color[i], d.mag[i]);
                let (ce, me) = (d.color_err[i], d.mag_err[i]);
                [
                    to_xy(c - ce, m).zip(to_xy(c + ce, m)),
                    to_xy(c, m - me).zip(to_xy(c, m + me)),
                ]
            });
            chart.draw_series(segments.flatten().filter_map(|(a, b)| {
                let a = (x.clamp(a.0), y.clamp(a.1));
                let b = (x.clamp(b.0), y.clamp(b.1));
                (a != b).then(|| PathElement::new(vec![a, b], bar_style))
            }))?;
        }

        let point_style = rgb(style.point_color).filled();
        chart.draw_series(
            d.color
                .iter()
                .zip(&d.mag)
                .filter_map(|(&c, &m)| to_xy(c, m))
                .filter(|&(px, py)| x.contains(px) && y.contains(py))
                .map(|p| Circle::new(p, style.point_size as i32, point_style)),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> CmdData {
        CmdData {
            color: vec![0.5, 1.0, 1.5],
            mag: vec![20.0, 22.0, 24.0],
            color_err: vec![0.05; 3],
            mag_err: vec![0.02; 3],
        }
    }

    fn labels() -> AxisLabels {
        AxisLabels {
            x: "V-I".to_string(),
            y: "I".to_string(),
        }
    }

    #[test]
    fn magnitude_axis_reversed_by_default() {
        let d = data();
        let fig = CmdFigure {
            data: &d,
            labels: labels(),
            xlim: None,
            ylim: None,
            error_bars: true,
        };
        let (x, y) = fig.axes().unwrap();
        assert!(!x.is_reversed());
        assert!(y.is_reversed());
    }

    #[test]
    fn explicit_limits_win() {
        let d = data();
        let fig = CmdFigure {
            data: &d,
            labels: labels(),
            xlim: Some(Limits::new(-1.0, 3.0)),
            ylim: Some(Limits::new(18.0, 26.0)),
            error_bars: false,
        };
        let (x, y) = fig.axes().unwrap();
        assert_eq!(x.range(), -1.0..3.0);
        assert!(!y.is_reversed());
    }

    #[test]
    fn empty_data_is_invalid() {
        let d = CmdData {
            color: vec![],
            mag: vec![],
            color_err: vec![],
            mag_err: vec![],
        };
        let fig = CmdFigure {
            data: &d,
            labels: labels(),
            xlim: None,
            ylim: None,
            error_bars: true,
        };
        assert!(matches!(fig.axes(), Err(RenderError::InvalidData(_))));
    }

    fn render(error_bars: bool, name: &str) -> u64 {
        let d = data();
        let fig = CmdFigure {
            data: &d,
            labels: labels(),
            xlim: None,
            ylim: None,
            error_bars,
        };
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(name);
        crate::render::save(&fig, &path, &PlotStyle::default()).unwrap();
        std::fs::metadata(&path).unwrap().len()
    }

    #[test]
    fn saves_png_with_error_bars() {
        assert!(render(true, "cmd.png") > 0);
    }

    #[test]
    fn saves_without_error_bars() {
        let with = render(true, "with.svg");
        let without = render(false, "without.svg");
        assert!(without > 0);
        assert!(without < with);
    }
}
