//! Core data model for the PLUMBER benchmark pipeline.
//!
//! This crate defines the typed configuration layer (INI-style files with
//! reference interpolation and value coercion) and the shared [`TimeSeries`]
//! frame type that the ingestion, statistics, and analysis crates operate on.

pub mod coerce;
pub mod config;
pub mod error;
pub mod series;
pub mod value;

pub use coerce::coerce;
pub use config::Config;
pub use error::ConfigError;
pub use series::{TIME_COLUMN, TimeSeries, VariableSelection};
pub use value::ConfigValue;
