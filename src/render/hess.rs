use std::path::Path;

use image::{ImageBuffer, Luma};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::binning::HessDiagram;
use crate::color::LogNorm;
use crate::style::PlotStyle;

use super::{build_chart, fill_background, Axis, AxisLabels, Figure, Limits, RenderError, Result};

/// Colour strip resolution.
const COLORBAR_STEPS: usize = 128;

// ---------------------------------------------------------------------------
// Hess diagram (density image)
// ---------------------------------------------------------------------------

/// Hess diagram drawn as shaded cells on a log colour scale.
pub struct HessFigure<'a> {
    pub hess: &'a HessDiagram,
    pub labels: AxisLabels,
    pub xlim: Option<Limits>,
    /// Without explicit limits the magnitude axis is reversed.
    pub ylim: Option<Limits>,
    pub norm: LogNorm,
    pub colorbar: bool,
}

impl HessFigure<'_> {
    fn axes(&self) -> (Axis, Axis) {
        let (c0, c1, m0, m1) = self.hess.extent();
        let x = self.xlim.unwrap_or(Limits::new(c0, c1));
        let y = self.ylim.unwrap_or(Limits::new(m1, m0));
        (Axis::linear(x), Axis::linear(y))
    }

    fn draw_cells<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, style: &PlotStyle) -> Result<()> {
        let (x, y) = self.axes();
        let mut chart = build_chart(area, &x, &y, &self.labels, style)?;

        let hess = self.hess;
        let cmap = style.colormap;
        let mut cells = Vec::new();
        for ci in 0..hess.n_color() {
            for mi in 0..hess.n_mag() {
                let Some(t) = self.norm.normalize(hess.get(ci, mi) as f64) else {
                    continue;
                };
                let corners = (
                    x.to_chart(hess.color_edges[ci]),
                    x.to_chart(hess.color_edges[ci + 1]),
                    y.to_chart(hess.mag_edges[mi]),
                    y.to_chart(hess.mag_edges[mi + 1]),
                );
                let (Some(xa), Some(xb), Some(ya), Some(yb)) = corners else {
                    continue;
                };
                let (x0, x1) = (x.clamp(xa.min(xb)), x.clamp(xa.max(xb)));
                let (y0, y1) = (y.clamp(ya.min(yb)), y.clamp(ya.max(yb)));
                if x0 == x1 || y0 == y1 {
                    continue;
                }
                cells.push(Rectangle::new([(x0, y1), (x1, y0)], cmap.sample(t).filled()));
            }
        }
        chart.draw_series(cells)?;
        Ok(())
    }

    fn draw_colorbar<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, style: &PlotStyle) -> Result<()> {
        let LogNorm { vmin, vmax } = self.norm;
        let top = if vmax > vmin { vmax } else { vmin * 10.0 };
        let axis = Axis::log(Limits::new(vmin, top));
        let r = axis.range();
        let width = Axis::linear(Limits::new(0.0, 1.0));

        let mut chart = ChartBuilder::on(area)
            .margin(style.margin as i32)
            .x_label_area_size(style.x_label_area as i32)
            .right_y_label_area_size(style.y_label_area as i32)
            .build_cartesian_2d(width.range(), r.clone())?;
        let font = style.font_family.as_str();
        chart
            .configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_label_formatter(&|v| axis.format_tick(*v))
            .label_style((font, f64::from(style.tick_size)).into_font())
            .draw()?;

        let step = (r.end - r.start) / COLORBAR_STEPS as f64;
        chart.draw_series((0..COLORBAR_STEPS).map(|i| {
            let lo = r.start + i as f64 * step;
            let t = (i as f64 + 0.5) / COLORBAR_STEPS as f64;
            Rectangle::new([(0.0, lo + step), (1.0, lo)], style.colormap.sample(t).filled())
        }))?;
        Ok(())
    }
}

impl Figure for HessFigure<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> Result<()> {
        if self.hess.total() == 0 {
            return Err(RenderError::InvalidData(
                "hess diagram has no populated cells".to_string(),
            ));
        }
        fill_background(root, style)?;

        if self.colorbar {
            let (w, _) = root.dim_in_pixel();
            let split = (w as i32 - style.colorbar_width as i32).max(1);
            let (main, bar) = root.split_horizontally(split);
            self.draw_cells(&main, style)?;
            self.draw_colorbar(&bar, style)?;
        } else {
            self.draw_cells(root, style)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Raw count grid export
// ---------------------------------------------------------------------------

/// Write the count grid as a 16-bit grayscale PNG, one pixel per bin.
///
/// Columns are color bins (blue to red), rows are magnitude bins with the
/// brightest at the top. Counts above `u16::MAX` saturate.
pub fn write_count_image(hess: &HessDiagram, path: &Path) -> Result<()> {
    let (w, h) = (hess.n_color() as u32, hess.n_mag() as u32);
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(w, h, |x, y| {
        let count = hess.get(x as usize, y as usize);
        Luma([count.min(u16::MAX as u64) as u16])
    });
    img.save(path)?;
    info!("wrote {w}x{h} count grid to {}", path.display());
    Ok(())
}
