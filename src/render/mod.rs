//! Rendering: turns CMD data, histograms and Hess grids into image files.
//!
//! Each plot type is a [`Figure`]; [`save`] picks the drawing backend from
//! the output file extension and hands it to the figure together with the
//! caller's [`PlotStyle`].

use std::path::Path;

use log::info;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

use crate::color::rgb;
use crate::style::PlotStyle;

pub mod axis;
pub mod cmd;
pub mod hess;
pub mod lf;

pub use axis::{Axis, Limits};

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unsupported output format: {0} (use png, jpg, bmp or svg)")]
    UnsupportedFormat(String),

    #[error("failed to draw plot: {0}")]
    Drawing(String),

    #[error("invalid plot data: {0}")]
    InvalidData(String),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

// ---------------------------------------------------------------------------
// Output selection
// ---------------------------------------------------------------------------

/// Which plotters backend writes the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// png / jpg / bmp through the bitmap backend.
    Bitmap,
    Svg,
}

impl OutputFormat {
    pub const BITMAP_EXTENSIONS: &'static [&'static str] = &["png", "jpg", "jpeg", "bmp"];

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if Self::BITMAP_EXTENSIONS.contains(&ext.as_str()) {
            Ok(OutputFormat::Bitmap)
        } else if ext == "svg" {
            Ok(OutputFormat::Svg)
        } else {
            Err(RenderError::UnsupportedFormat(format!(".{ext}")))
        }
    }
}

/// Axis descriptions.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
}

// ---------------------------------------------------------------------------
// Figure trait and file output
// ---------------------------------------------------------------------------

/// A plot that can draw itself onto any plotters backend.
pub trait Figure {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> Result<()>;
}

/// Render `figure` to `path`, choosing the backend from the extension.
pub fn save<F: Figure>(figure: &F, path: &Path, style: &PlotStyle) -> Result<()> {
    let size = (style.width, style.height);
    match OutputFormat::from_path(path)? {
        OutputFormat::Bitmap => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            figure.draw(&root, style)?;
            root.present()?;
        }
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            figure.draw(&root, style)?;
            root.present()?;
        }
    }
    info!("rendered {}x{} plot to {}", size.0, size.1, path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared chart helpers
// ---------------------------------------------------------------------------

pub(crate) type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Cartesian chart over the two axes' chart-coordinate ranges, with ticks
/// labelled in data units.
pub(crate) fn build_chart<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    x: &Axis,
    y: &Axis,
    labels: &AxisLabels,
    style: &PlotStyle,
) -> Result<Chart<'a, DB>> {
    let mut chart = ChartBuilder::on(area)
        .margin(style.margin as i32)
        .x_label_area_size(style.x_label_area as i32)
        .y_label_area_size(style.y_label_area as i32)
        .build_cartesian_2d(x.range(), y.range())?;

    let font = style.font_family.as_str();
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(labels.x.as_str())
        .y_desc(labels.y.as_str())
        .x_label_formatter(&|v| x.format_tick(*v))
        .y_label_formatter(&|v| y.format_tick(*v))
        .axis_desc_style((font, f64::from(style.label_size)).into_font())
        .label_style((font, f64::from(style.tick_size)).into_font())
        .draw()?;

    Ok(chart)
}

pub(crate) fn fill_background<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, style: &PlotStyle) -> Result<()> {
    root.fill(&rgb(style.background))?;
    Ok(())
}
