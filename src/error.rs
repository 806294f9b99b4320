use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// PhotometryError – failures in the data layer
// ---------------------------------------------------------------------------

/// Errors raised while loading, filtering or binning photometry.
///
/// Every variant is fatal for the command that produced it; `main` reports
/// the chain and exits non-zero.
#[derive(Error, Debug)]
pub enum PhotometryError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("data format error: {0}")]
    DataFormat(String),

    #[error("unknown instrument '{0}' (expected one of ACS, WFPC2, UVIS, IR)")]
    UnknownInstrument(String),

    #[error("unknown filter '{name}' (expected {first}, {second}, 1 or 2)")]
    UnknownFilter {
        name: String,
        first: String,
        second: String,
    },

    #[error("{context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("{context}")]
    Parquet {
        context: String,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("{context}")]
    Arrow {
        context: String,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("{context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("binning error: {0}")]
    Binning(String),

    #[error("no rows left after removing undetected stars")]
    EmptySelection,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PhotometryError {
    pub fn format(msg: impl Into<String>) -> Self {
        PhotometryError::DataFormat(msg.into())
    }

    pub fn csv(context: impl Into<String>) -> impl FnOnce(csv::Error) -> Self {
        let context = context.into();
        move |source| PhotometryError::Csv { context, source }
    }

    pub fn parquet(context: impl Into<String>) -> impl FnOnce(parquet::errors::ParquetError) -> Self {
        let context = context.into();
        move |source| PhotometryError::Parquet { context, source }
    }
}

pub type Result<T> = std::result::Result<T, PhotometryError>;
