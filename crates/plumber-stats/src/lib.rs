//! Statistics for the PLUMBER benchmark.
//!
//! [`kernels`] holds the individual estimators; [`compare`] runs the whole
//! battery over the variables two time series share.

pub mod compare;
pub mod kernels;

pub use compare::{CompareOptions, ComparisonResult, compare};
