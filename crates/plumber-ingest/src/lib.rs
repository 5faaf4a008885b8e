//! Data ingestion for the PLUMBER benchmark.
//!
//! Each source file, whatever its format, comes out as a [`TimeSeries`]
//! with the same shape: a `time` column of millisecond datetimes first,
//! float variable columns after, rows sorted and resampled onto the
//! half-hourly benchmark grid. Two formats are supported, dispatched on
//! file extension: array-dataset JSON documents ([`dataset`]) and flat CSV
//! tables ([`table`]).

pub mod dataset;
pub mod error;
mod frame;
pub mod resample;
pub mod table;
pub mod timeaxis;

pub use dataset::ingest_dataset;
pub use error::{IngestError, Result};
pub use resample::{DEFAULT_STEP_MINUTES, resample_nearest};
pub use table::ingest_table;
pub use timeaxis::TimeUnits;

use std::path::Path;

use plumber_model::{TimeSeries, VariableSelection};

/// Ingest one source file, dispatching on its extension.
pub fn ingest(
    path: &Path,
    selection: &VariableSelection,
    tshift_minutes: Option<i64>,
) -> Result<TimeSeries> {
    let extension = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => dataset::ingest_dataset(path, selection, tshift_minutes),
        Some("csv") => table::ingest_table(path, selection, tshift_minutes),
        _ => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
