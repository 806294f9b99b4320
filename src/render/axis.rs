use std::ops::Range;

use crate::error::PhotometryError;

/// Axis limits as the user sees them: `first` at the bottom/left, `second` at
/// the top/right. `first > second` means the axis runs backwards, which is how
/// magnitude axes are normally drawn (bright stars at the top).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub first: f64,
    pub second: f64,
}

impl Limits {
    pub fn new(first: f64, second: f64) -> Self {
        Limits { first, second }
    }

    /// Data range padded by 5% on both sides.
    pub fn padded(values: &[f64]) -> Option<Self> {
        let lo = values.iter().copied().filter(|v| v.is_finite()).fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().filter(|v| v.is_finite()).fold(f64::NEG_INFINITY, f64::max);
        if lo > hi {
            return None;
        }
        let pad = if hi > lo { 0.05 * (hi - lo) } else { 0.5 };
        Some(Limits::new(lo - pad, hi + pad))
    }

    pub fn reversed(self) -> Self {
        Limits::new(self.second, self.first)
    }

    /// Parse `"a,b"`.
    pub fn parse(s: &str) -> Result<Self, PhotometryError> {
        let bad = || PhotometryError::format(format!("expected axis limits as 'a,b', got '{s}'"));
        let (a, b) = s.split_once(',').ok_or_else(bad)?;
        let a: f64 = a.trim().parse().map_err(|_| bad())?;
        let b: f64 = b.trim().parse().map_err(|_| bad())?;
        if !(a.is_finite() && b.is_finite()) || a == b {
            return Err(bad());
        }
        Ok(Limits::new(a, b))
    }
}

/// One plot axis: limits plus the transform into chart coordinates.
///
/// The chart itself always runs low → high; a reversed axis is drawn by
/// negating values and un-negating the tick labels, and a log axis plots
/// `log10(v)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    limits: Limits,
    log: bool,
    precision: usize,
}

impl Axis {
    pub fn linear(limits: Limits) -> Self {
        Axis {
            limits,
            log: false,
            precision: 1,
        }
    }

    /// Log10 axis. Limits must be positive.
    pub fn log(limits: Limits) -> Self {
        Axis {
            limits,
            log: true,
            precision: 0,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn is_reversed(&self) -> bool {
        self.limits.first > self.limits.second
    }

    fn scale(&self, v: f64) -> Option<f64> {
        if self.log {
            (v > 0.0).then(|| v.log10())
        } else {
            Some(v)
        }
    }

    /// Chart coordinate for data value `v`; `None` if `v` cannot be shown
    /// on this axis (non-positive on a log axis).
    pub fn to_chart(&self, v: f64) -> Option<f64> {
        let s = self.scale(v)?;
        Some(if self.is_reversed() { -s } else { s })
    }

    /// Chart-coordinate range handed to the chart builder.
    pub fn range(&self) -> Range<f64> {
        let a = self.to_chart(self.limits.first).unwrap_or(0.0);
        let b = self.to_chart(self.limits.second).unwrap_or(a + 1.0);
        if a < b {
            a..b
        } else {
            a..a + 1.0
        }
    }

    /// Clamp a chart coordinate into the visible range.
    pub fn clamp(&self, c: f64) -> f64 {
        let r = self.range();
        c.clamp(r.start, r.end)
    }

    pub fn contains(&self, c: f64) -> bool {
        let r = self.range();
        c >= r.start && c <= r.end
    }

    /// Tick label for chart coordinate `c`, in data units.
    pub fn format_tick(&self, c: f64) -> String {
        let s = if self.is_reversed() { -c } else { c };
        let v = if self.log { 10f64.powf(s) } else { s };
        format!("{:.*}", self.precision, v)
    }
}
