//! Fixed-cadence resampling by nearest-neighbour row selection.

use plumber_model::TIME_COLUMN;
use plumber_model::series::time_epochs_ms;
use polars::prelude::{DataFrame, Int64Chunked, IntoSeries, TimeUnit, UInt32Chunked};

use crate::error::Result;

/// Canonical output cadence of the benchmark.
pub const DEFAULT_STEP_MINUTES: i64 = 30;

const MS_PER_MINUTE: i64 = 60_000;

/// Snap a frame onto a fixed-cadence grid.
///
/// The grid runs from the first timestamp floored to a step boundary through
/// the last timestamp ceiled to one. Each grid point takes the whole row of
/// the closest input timestamp, ties breaking toward the earlier row, so one
/// input row may serve several grid points and others may serve none. The
/// input must already be sorted by time; an empty frame comes back
/// unchanged.
pub fn resample_nearest(df: &DataFrame, step_minutes: i64) -> Result<DataFrame> {
    let epochs = time_epochs_ms(df)?;
    if epochs.is_empty() {
        return Ok(df.clone());
    }
    let step = step_minutes * MS_PER_MINUTE;
    let start = floor_to_step(epochs[0], step);
    let end = ceil_to_step(epochs[epochs.len() - 1], step);

    let mut grid = Vec::new();
    let mut indices = Vec::new();
    let mut cursor = 0usize;
    let mut stamp = start;
    while stamp <= end {
        while cursor + 1 < epochs.len()
            && (epochs[cursor + 1] - stamp).abs() < (epochs[cursor] - stamp).abs()
        {
            cursor += 1;
        }
        grid.push(stamp);
        indices.push(cursor as u32);
        stamp += step;
    }

    let idx = UInt32Chunked::from_vec("idx".into(), indices);
    let mut resampled = df.take(&idx)?;
    let time = Int64Chunked::from_vec(TIME_COLUMN.into(), grid)
        .into_datetime(TimeUnit::Milliseconds, None)
        .into_series();
    resampled.with_column(time)?;
    Ok(resampled)
}

fn floor_to_step(value: i64, step: i64) -> i64 {
    value - value.rem_euclid(step)
}

fn ceil_to_step(value: i64, step: i64) -> i64 {
    let floored = floor_to_step(value, step);
    if floored == value { value } else { floored + step }
}
