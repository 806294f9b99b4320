//! Histogram binning for luminosity functions and Hess diagrams.
//!
//! Bin edges are generated the way `arange(lo, hi, step)` does it: the edge
//! count is `ceil((hi - lo) / step)` and edge `i` is `lo + i * step`. The
//! largest value is therefore not guaranteed to land in a bin; rows beyond the
//! last edge are dropped, never clipped into the outermost bin.

use log::debug;

use crate::error::{PhotometryError, Result};

/// Upper bound on the number of edges per axis.
pub const MAX_BINS: usize = 1_000_000;

/// Uniformly spaced edges from `lo` towards `hi`, excluding `hi` itself.
///
/// `uniform_edges(0.0, 1.0, 0.3)` gives `[0.0, 0.3, 0.6, 0.9]`.
pub fn uniform_edges(lo: f64, hi: f64, step: f64) -> Result<Vec<f64>> {
    if !(step.is_finite() && step > 0.0) {
        return Err(PhotometryError::Binning(format!(
            "bin width must be positive and finite, got {step}"
        )));
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return Err(PhotometryError::Binning(format!(
            "range must be finite, got [{lo}, {hi}]"
        )));
    }
    let n = ((hi - lo) / step).ceil();
    if n <= 0.0 {
        return Ok(Vec::new());
    }
    if n > MAX_BINS as f64 {
        return Err(PhotometryError::Binning(format!(
            "bin width {step} over [{lo}, {hi}] gives {n} bins, more than {MAX_BINS}"
        )));
    }
    Ok((0..n as usize).map(|i| lo + i as f64 * step).collect())
}

/// Index of the bin holding `x`, or `None` if it falls outside the edges.
///
/// Bins are half-open `[e_i, e_{i+1})` except the last, which also includes
/// its right edge.
fn bin_index(edges: &[f64], x: f64) -> Option<usize> {
    let n_bins = edges.len().checked_sub(1)?;
    if n_bins == 0 || x.is_nan() {
        return None;
    }
    let (first, last) = (edges[0], edges[n_bins]);
    if x < first || x > last {
        return None;
    }
    if x == last {
        return Some(n_bins - 1);
    }
    Some(edges.partition_point(|&e| e <= x) - 1)
}

fn check_edges(edges: &[f64], axis: &str) -> Result<()> {
    if edges.len() < 2 {
        return Err(PhotometryError::Binning(format!(
            "{axis} axis needs at least two bin edges, got {}",
            edges.len()
        )));
    }
    if edges.windows(2).any(|w| !(w[0] < w[1])) {
        return Err(PhotometryError::Binning(format!(
            "{axis} bin edges must increase monotonically"
        )));
    }
    Ok(())
}

fn value_range(values: &[f64], axis: &str) -> Result<(f64, f64)> {
    if values.is_empty() {
        return Err(PhotometryError::Binning(format!(
            "cannot bin an empty {axis} sequence"
        )));
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((lo, hi))
}

/// Edges spanning `values` with the given width, unless `explicit` is given.
fn edges_for(values: &[f64], width: f64, explicit: Option<&[f64]>, axis: &str) -> Result<Vec<f64>> {
    let edges = match explicit {
        Some(e) => e.to_vec(),
        None => {
            let (lo, hi) = value_range(values, axis)?;
            uniform_edges(lo, hi, width)?
        }
    };
    check_edges(&edges, axis)?;
    Ok(edges)
}

fn centers(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}

// ---------------------------------------------------------------------------
// 1D: luminosity function
// ---------------------------------------------------------------------------

/// Counts per bin; `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram1D {
    pub fn centers(&self) -> Vec<f64> {
        centers(&self.edges)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Count `values` into the bins defined by `edges`.
pub fn histogram(values: &[f64], edges: &[f64]) -> Result<Histogram1D> {
    check_edges(edges, "histogram")?;
    let mut counts = vec![0u64; edges.len() - 1];
    for &v in values {
        if let Some(i) = bin_index(edges, v) {
            counts[i] += 1;
        }
    }
    Ok(Histogram1D {
        edges: edges.to_vec(),
        counts,
    })
}

/// Magnitude histogram with `bin_width` bins from min to max magnitude, or
/// over `edges` when supplied.
pub fn luminosity_function(mag: &[f64], bin_width: f64, edges: Option<&[f64]>) -> Result<Histogram1D> {
    let edges = edges_for(mag, bin_width, edges, "magnitude")?;
    let lf = histogram(mag, &edges)?;
    debug!(
        "luminosity function: {} bins, {} of {} stars binned",
        lf.counts.len(),
        lf.total(),
        mag.len()
    );
    Ok(lf)
}

// ---------------------------------------------------------------------------
// 2D: Hess diagram
// ---------------------------------------------------------------------------

/// Bin parameters for [`make_hess`].
#[derive(Debug, Clone, Default)]
pub struct HessBins {
    /// Magnitude bin width.
    pub mag_width: f64,
    /// Color bin width; the magnitude width is used when `None`.
    pub color_width: Option<f64>,
    pub color_edges: Option<Vec<f64>>,
    pub mag_edges: Option<Vec<f64>>,
}

impl HessBins {
    pub fn new(mag_width: f64, color_width: Option<f64>) -> Self {
        HessBins {
            mag_width,
            color_width,
            ..Default::default()
        }
    }
}

/// A 2D count grid indexed by (color bin, magnitude bin).
#[derive(Debug, Clone, PartialEq)]
pub struct HessDiagram {
    pub color_edges: Vec<f64>,
    pub mag_edges: Vec<f64>,
    /// Row-major: `counts[color_bin * n_mag() + mag_bin]`.
    counts: Vec<u64>,
}

impl HessDiagram {
    pub fn n_color(&self) -> usize {
        self.color_edges.len() - 1
    }

    pub fn n_mag(&self) -> usize {
        self.mag_edges.len() - 1
    }

    pub fn get(&self, color_bin: usize, mag_bin: usize) -> u64 {
        self.counts[color_bin * self.n_mag() + mag_bin]
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Outer bounds `(color_min, color_max, mag_min, mag_max)` of the grid.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        (
            self.color_edges[0],
            self.color_edges[self.n_color()],
            self.mag_edges[0],
            self.mag_edges[self.n_mag()],
        )
    }
}

/// Bin stars by color and magnitude.
pub fn make_hess(color: &[f64], mag: &[f64], bins: &HessBins) -> Result<HessDiagram> {
    if color.len() != mag.len() {
        return Err(PhotometryError::Binning(format!(
            "color has {} values but magnitude has {}",
            color.len(),
            mag.len()
        )));
    }

    let mag_edges = edges_for(mag, bins.mag_width, bins.mag_edges.as_deref(), "magnitude")?;
    let color_width = bins.color_width.unwrap_or(bins.mag_width);
    let color_edges = edges_for(color, color_width, bins.color_edges.as_deref(), "color")?;

    let n_mag = mag_edges.len() - 1;
    let mut counts = vec![0u64; (color_edges.len() - 1) * n_mag];

    for (&c, &m) in color.iter().zip(mag) {
        if let (Some(ci), Some(mi)) = (bin_index(&color_edges, c), bin_index(&mag_edges, m)) {
            counts[ci * n_mag + mi] += 1;
        }
    }

    let hess = HessDiagram {
        color_edges,
        mag_edges,
        counts,
    };
    debug!(
        "hess diagram: {}x{} bins, {} of {} stars binned",
        hess.n_color(),
        hess.n_mag(),
        hess.total(),
        color.len()
    );
    Ok(hess)
}
