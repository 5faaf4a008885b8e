//! Reader for flat CSV tables.
//!
//! One header row, one timestamp column, every other column a variable.
//! Timestamps are ISO-like text (or already-numeric epoch values); cells
//! that fail numeric conversion become missing values rather than errors.

use std::path::Path;

use tracing::debug;

use plumber_model::series::{any_to_epoch_ms, any_to_f64, any_to_string};
use plumber_model::{TimeSeries, VariableSelection};
use polars::prelude::{AnyValue, CsvReadOptions, SerReader};

use crate::error::{IngestError, Result};
use crate::frame::{RawColumn, apply_selection, build_frame, synthesize_net_radiation};
use crate::resample::{DEFAULT_STEP_MINUTES, resample_nearest};
use crate::timeaxis::{find_time_name, parse_timestamp_ms};

const MS_PER_MINUTE: i64 = 60_000;

/// Read one CSV table into a normalized half-hourly time series.
pub fn ingest_table(
    path: &Path,
    selection: &VariableSelection,
    tshift_minutes: Option<i64>,
) -> Result<TimeSeries> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str().to_string())
        .collect();
    let time_name = find_time_name(names.iter().map(String::as_str), path)?;

    let time_column = df.column(&time_name)?;
    let mut epochs = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = time_column.get(idx).unwrap_or(AnyValue::Null);
        let ms = match any_to_epoch_ms(value.clone()) {
            Some(ms) => ms,
            None => {
                let text = any_to_string(value);
                parse_timestamp_ms(&text).ok_or_else(|| IngestError::BadTimestamp {
                    path: path.to_path_buf(),
                    value: text.clone(),
                })?
            }
        };
        epochs.push(ms);
    }
    if epochs.is_empty() {
        return Err(IngestError::EmptyTimeAxis {
            path: path.to_path_buf(),
        });
    }
    if let Some(shift) = tshift_minutes {
        let offset = shift * MS_PER_MINUTE;
        for ms in &mut epochs {
            *ms += offset;
        }
    }

    let mut columns: Vec<RawColumn> = Vec::new();
    for name in &names {
        if *name == time_name {
            continue;
        }
        let column = df.column(name)?;
        let mut values = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            values.push(any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)));
        }
        columns.push((name.clone(), values));
    }
    synthesize_net_radiation(&mut columns);
    let columns = apply_selection(columns, selection);

    let frame = build_frame(epochs, columns)?;
    let frame = resample_nearest(&frame, DEFAULT_STEP_MINUTES)?;
    debug!(
        rows = frame.height(),
        columns = frame.width(),
        "ingested table {}",
        path.display()
    );
    Ok(TimeSeries::new(frame))
}
