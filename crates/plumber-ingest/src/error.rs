//! Error types for dataset ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a source file into a time series.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source file does not exist.
    #[error("dataset file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Source file exists but could not be read.
    #[error("failed to read dataset {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension maps to no known reader.
    #[error("unsupported dataset format: {path} (expected .json or .csv)")]
    UnsupportedFormat { path: PathBuf },

    /// Document did not match the expected dataset layout.
    #[error("failed to decode dataset {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// CSV could not be parsed into a frame.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// No axis name contains "time".
    #[error("no time dimension in {path} (axes: {dims:?})")]
    NoTimeDimension { path: PathBuf, dims: Vec<String> },

    /// More than one axis name contains "time".
    #[error("ambiguous time dimension in {path} (candidates: {candidates:?})")]
    AmbiguousTimeDimension {
        path: PathBuf,
        candidates: Vec<String>,
    },

    /// A variable's value count disagrees with its declared dimensions.
    #[error("variable '{variable}' in {path} has {actual} values, expected {expected}")]
    ShapeMismatch {
        path: PathBuf,
        variable: String,
        expected: usize,
        actual: usize,
    },

    /// The time axis carries no units string, so raw values cannot be decoded.
    #[error("time axis in {path} carries no units string")]
    MissingTimeUnits { path: PathBuf },

    /// The units string is not of the `"<unit> since <datetime>"` form.
    #[error("cannot interpret time units '{units}' in {path}")]
    BadTimeUnits { path: PathBuf, units: String },

    /// A timestamp cell could not be parsed.
    #[error("unreadable timestamp '{value}' in {path}")]
    BadTimestamp { path: PathBuf, value: String },

    /// The file holds no time steps at all.
    #[error("time axis in {path} is empty")]
    EmptyTimeAxis { path: PathBuf },

    /// A frame operation failed downstream of decoding.
    #[error("data frame operation failed: {message}")]
    Frame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        IngestError::Frame {
            message: err.to_string(),
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, IngestError>;
