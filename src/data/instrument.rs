use std::fmt;
use std::str::FromStr;

use crate::error::PhotometryError;

// ---------------------------------------------------------------------------
// Instrument – camera named in the table header
// ---------------------------------------------------------------------------

/// Cameras whose photometry tables we know how to read.
///
/// Each camera names its magnitude columns `MAG1_<suffix>` / `MAG2_<suffix>`;
/// the uncertainty columns are always `MAG1_ERR` / `MAG2_ERR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    /// HST Advanced Camera for Surveys, wide field channel.
    Acs,
    /// HST Wide Field and Planetary Camera 2.
    Wfpc2,
    /// HST Wide Field Camera 3, UV/visible channel.
    Wfc3Uvis,
    /// HST Wide Field Camera 3, infrared channel.
    Wfc3Ir,
}

/// Header spelling → instrument. Matched case-insensitively.
const KNOWN_INSTRUMENTS: &[(&str, Instrument)] = &[
    ("ACS", Instrument::Acs),
    ("ACS/WFC", Instrument::Acs),
    ("WFPC2", Instrument::Wfpc2),
    ("UVIS", Instrument::Wfc3Uvis),
    ("WFC3/UVIS", Instrument::Wfc3Uvis),
    ("IR", Instrument::Wfc3Ir),
    ("WFC3/IR", Instrument::Wfc3Ir),
];

impl Instrument {
    /// Suffix used in the magnitude column names.
    pub fn column_suffix(self) -> &'static str {
        match self {
            Instrument::Acs => "ACS",
            Instrument::Wfpc2 => "WFPC2",
            Instrument::Wfc3Uvis => "UVIS",
            Instrument::Wfc3Ir => "IR",
        }
    }

    pub fn mag1_column(self) -> String {
        format!("MAG1_{}", self.column_suffix())
    }

    pub fn mag2_column(self) -> String {
        format!("MAG2_{}", self.column_suffix())
    }

    pub const MAG1_ERR_COLUMN: &'static str = "MAG1_ERR";
    pub const MAG2_ERR_COLUMN: &'static str = "MAG2_ERR";
}

impl FromStr for Instrument {
    type Err = PhotometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        KNOWN_INSTRUMENTS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, inst)| *inst)
            .ok_or_else(|| PhotometryError::UnknownInstrument(wanted.to_string()))
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("acs".parse::<Instrument>().unwrap(), Instrument::Acs);
        assert_eq!(" WFPC2 ".parse::<Instrument>().unwrap(), Instrument::Wfpc2);
        assert_eq!("wfc3/uvis".parse::<Instrument>().unwrap(), Instrument::Wfc3Uvis);
        assert_eq!("IR".parse::<Instrument>().unwrap(), Instrument::Wfc3Ir);
    }

    #[test]
    fn unknown_instrument_is_an_error() {
        let err = "NIRCAM".parse::<Instrument>().unwrap_err();
        assert!(matches!(err, PhotometryError::UnknownInstrument(ref n) if n == "NIRCAM"));
    }

    #[test]
    fn column_names_follow_suffix() {
        assert_eq!(Instrument::Acs.mag1_column(), "MAG1_ACS");
        assert_eq!(Instrument::Wfc3Ir.mag2_column(), "MAG2_IR");
    }
}
