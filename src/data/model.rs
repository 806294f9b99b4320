use std::fmt;
use std::str::FromStr;

use crate::error::{PhotometryError, Result};

use super::instrument::Instrument;

// ---------------------------------------------------------------------------
// PhotometryTable – the loaded source file
// ---------------------------------------------------------------------------

/// Two-filter photometry, one entry per star.
///
/// All four columns have the same length. Magnitudes of stars not recovered
/// in a filter hold a sentinel (≥ 30) rather than a null.
#[derive(Debug, Clone)]
pub struct PhotometryTable {
    pub instrument: Instrument,
    pub mag1: Vec<f64>,
    pub mag2: Vec<f64>,
    pub mag1_err: Vec<f64>,
    pub mag2_err: Vec<f64>,
}

impl PhotometryTable {
    /// Assemble a table, checking column lengths and uncertainty signs.
    pub fn new(
        instrument: Instrument,
        mag1: Vec<f64>,
        mag2: Vec<f64>,
        mag1_err: Vec<f64>,
        mag2_err: Vec<f64>,
    ) -> Result<Self> {
        let n = mag1.len();
        if mag2.len() != n || mag1_err.len() != n || mag2_err.len() != n {
            return Err(PhotometryError::format(format!(
                "column lengths differ: mag1={n}, mag2={}, mag1_err={}, mag2_err={}",
                mag2.len(),
                mag1_err.len(),
                mag2_err.len()
            )));
        }
        for (name, col) in [
            (Instrument::MAG1_ERR_COLUMN, &mag1_err),
            (Instrument::MAG2_ERR_COLUMN, &mag2_err),
        ] {
            if let Some(row) = col.iter().position(|&e| e < 0.0) {
                return Err(PhotometryError::format(format!(
                    "row {row}: negative uncertainty in {name}"
                )));
            }
        }
        Ok(PhotometryTable {
            instrument,
            mag1,
            mag2,
            mag1_err,
            mag2_err,
        })
    }

    pub fn len(&self) -> usize {
        self.mag1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mag1.is_empty()
    }

    /// Derive color / magnitude sequences with `which` on the y-axis.
    pub fn to_cmd(&self, which: YFilter) -> CmdData {
        let color = self
            .mag1
            .iter()
            .zip(&self.mag2)
            .map(|(m1, m2)| m1 - m2)
            .collect();
        let color_err = self
            .mag1_err
            .iter()
            .zip(&self.mag2_err)
            .map(|(e1, e2)| (e1 * e1 + e2 * e2).sqrt())
            .collect();
        let (mag, mag_err) = match which {
            YFilter::First => (self.mag1.clone(), self.mag1_err.clone()),
            YFilter::Second => (self.mag2.clone(), self.mag2_err.clone()),
        };
        CmdData {
            color,
            mag,
            color_err,
            mag_err,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter labels and y-axis selection
// ---------------------------------------------------------------------------

/// Display names of the two filters, e.g. `V` and `I` or `F555W` and `F814W`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterNames {
    pub first: String,
    pub second: String,
}

impl Default for FilterNames {
    fn default() -> Self {
        FilterNames {
            first: "V".to_string(),
            second: "I".to_string(),
        }
    }
}

impl FromStr for FilterNames {
    type Err = PhotometryError;

    /// Parse `"V,I"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',').map(str::trim);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(first), Some(second), None) if !first.is_empty() && !second.is_empty() => {
                Ok(FilterNames {
                    first: first.to_string(),
                    second: second.to_string(),
                })
            }
            _ => Err(PhotometryError::format(format!(
                "expected two comma separated filter names, got '{s}'"
            ))),
        }
    }
}

impl FilterNames {
    /// Label for the color axis, `first-second`.
    pub fn color_label(&self) -> String {
        format!("{}-{}", self.first, self.second)
    }

    pub fn label(&self, which: YFilter) -> &str {
        match which {
            YFilter::First => &self.first,
            YFilter::Second => &self.second,
        }
    }
}

/// Which filter's magnitude goes on the y-axis (or into the LF).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YFilter {
    /// `MAG1_*` – the bluer filter, subtracted from in the color.
    First,
    /// `MAG2_*` – the redder filter.
    Second,
}

impl YFilter {
    /// Resolve a user-supplied name against the filter labels.
    ///
    /// Accepts either label (case-insensitive), the literal `1` / `2`, or the
    /// positional names `V` / `I` when neither label claims them.
    pub fn resolve(name: &str, filters: &FilterNames) -> Result<Self> {
        let wanted = name.trim();
        if wanted.eq_ignore_ascii_case(&filters.first) {
            Ok(YFilter::First)
        } else if wanted.eq_ignore_ascii_case(&filters.second) {
            Ok(YFilter::Second)
        } else if wanted == "1" || wanted.eq_ignore_ascii_case("V") {
            Ok(YFilter::First)
        } else if wanted == "2" || wanted.eq_ignore_ascii_case("I") {
            Ok(YFilter::Second)
        } else {
            Err(PhotometryError::UnknownFilter {
                name: wanted.to_string(),
                first: filters.first.clone(),
                second: filters.second.clone(),
            })
        }
    }
}

impl fmt::Display for YFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YFilter::First => write!(f, "MAG1"),
            YFilter::Second => write!(f, "MAG2"),
        }
    }
}

// ---------------------------------------------------------------------------
// CmdData – what the aggregators consume
// ---------------------------------------------------------------------------

/// Color, magnitude and their uncertainties; all four vectors have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct CmdData {
    pub color: Vec<f64>,
    pub mag: Vec<f64>,
    pub color_err: Vec<f64>,
    pub mag_err: Vec<f64>,
}

impl CmdData {
    pub fn len(&self) -> usize {
        self.color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_empty()
    }

    /// Copy out the given rows, in the order given.
    pub fn select(&self, indices: &[usize]) -> CmdData {
        let pick = |v: &[f64]| indices.iter().map(|&i| v[i]).collect::<Vec<_>>();
        CmdData {
            color: pick(&self.color),
            mag: pick(&self.mag),
            color_err: pick(&self.color_err),
            mag_err: pick(&self.mag_err),
        }
    }
}
