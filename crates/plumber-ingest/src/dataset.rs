//! Reader for the array-dataset document format.
//!
//! A dataset is a JSON document declaring named dimensions and a flat map of
//! variables, each carrying its dimension list, a row-major value buffer and
//! an optional units string. Station files put single-point grids behind
//! extra spatial dimensions; this reader collapses every non-time dimension
//! at index zero so each variable becomes one column over the time axis.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use plumber_model::{TimeSeries, VariableSelection};

use crate::error::{IngestError, Result};
use crate::frame::{RawColumn, apply_selection, build_frame, synthesize_net_radiation};
use crate::resample::{DEFAULT_STEP_MINUTES, resample_nearest};
use crate::timeaxis::{TimeUnits, find_time_name};

#[derive(Debug, Deserialize)]
struct RawDataset {
    dims: BTreeMap<String, usize>,
    variables: BTreeMap<String, RawVariable>,
}

#[derive(Debug, Deserialize)]
struct RawVariable {
    #[serde(default)]
    dims: Vec<String>,
    /// Row-major value buffer; `null` entries mark missing samples.
    values: Vec<Option<f64>>,
    #[serde(default)]
    units: Option<String>,
}

/// Read one array-dataset file into a normalized half-hourly time series.
pub fn ingest_dataset(
    path: &Path,
    selection: &VariableSelection,
    tshift_minutes: Option<i64>,
) -> Result<TimeSeries> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let raw: RawDataset = serde_json::from_str(&text).map_err(|e| IngestError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let time_dim = find_time_name(raw.dims.keys().map(String::as_str), path)?;
    let steps = raw.dims.get(&time_dim).copied().unwrap_or(0);
    if steps == 0 {
        return Err(IngestError::EmptyTimeAxis {
            path: path.to_path_buf(),
        });
    }

    let time_var = raw
        .variables
        .get(&time_dim)
        .ok_or_else(|| IngestError::Decode {
            path: path.to_path_buf(),
            message: format!("time dimension '{time_dim}' has no coordinate variable"),
        })?;
    if time_var.values.len() != steps {
        return Err(IngestError::ShapeMismatch {
            path: path.to_path_buf(),
            variable: time_dim.clone(),
            expected: steps,
            actual: time_var.values.len(),
        });
    }
    let units = time_var
        .units
        .as_deref()
        .ok_or_else(|| IngestError::MissingTimeUnits {
            path: path.to_path_buf(),
        })?;
    let time_units = TimeUnits::parse(units).ok_or_else(|| IngestError::BadTimeUnits {
        path: path.to_path_buf(),
        units: units.to_string(),
    })?;

    let mut raw_times = Vec::with_capacity(steps);
    for value in &time_var.values {
        let value = value.ok_or_else(|| IngestError::Decode {
            path: path.to_path_buf(),
            message: "time axis holds a null value".to_string(),
        })?;
        raw_times.push(value);
    }
    // Shift the raw axis before decoding, so the offset is expressed in the
    // axis base unit of seconds.
    if let Some(shift) = tshift_minutes {
        let offset = (shift * 60) as f64;
        for value in &mut raw_times {
            *value += offset;
        }
    }
    let epochs: Vec<i64> = raw_times
        .iter()
        .map(|value| time_units.decode_ms(*value))
        .collect();

    let mut columns: Vec<RawColumn> = Vec::new();
    for (name, variable) in &raw.variables {
        if *name == time_dim || raw.dims.contains_key(name) {
            // the axis itself, or another coordinate variable
            continue;
        }
        let collapsed = collapse_variable(path, name, variable, &raw.dims, &time_dim, steps)?;
        columns.push((name.clone(), collapsed));
    }
    synthesize_net_radiation(&mut columns);
    let columns = apply_selection(columns, selection);

    let frame = build_frame(epochs, columns)?;
    let frame = resample_nearest(&frame, DEFAULT_STEP_MINUTES)?;
    debug!(
        rows = frame.height(),
        columns = frame.width(),
        "ingested dataset {}",
        path.display()
    );
    Ok(TimeSeries::new(frame))
}

/// Reduce one variable to a single column over the time axis.
///
/// Multi-dimensional values are stored row-major; holding every non-time
/// index at zero means stepping through the buffer by the time axis stride.
/// A variable with no time dimension broadcasts its first value across the
/// whole series.
fn collapse_variable(
    path: &Path,
    name: &str,
    variable: &RawVariable,
    dims: &BTreeMap<String, usize>,
    time_dim: &str,
    steps: usize,
) -> Result<Vec<Option<f64>>> {
    let mut shape = Vec::with_capacity(variable.dims.len());
    for dim in &variable.dims {
        let size = dims.get(dim).copied().ok_or_else(|| IngestError::Decode {
            path: path.to_path_buf(),
            message: format!("variable '{name}' uses undeclared dimension '{dim}'"),
        })?;
        shape.push(size);
    }
    let expected: usize = shape.iter().product();
    if variable.values.len() != expected {
        return Err(IngestError::ShapeMismatch {
            path: path.to_path_buf(),
            variable: name.to_string(),
            expected,
            actual: variable.values.len(),
        });
    }

    match variable.dims.iter().position(|dim| dim == time_dim) {
        Some(axis) => {
            let stride: usize = shape[axis + 1..].iter().product();
            Ok((0..steps)
                .map(|step| variable.values[step * stride].and_then(finite_or_none))
                .collect())
        }
        None => {
            let value = variable
                .values
                .first()
                .copied()
                .flatten()
                .and_then(finite_or_none);
            Ok(vec![value; steps])
        }
    }
}

fn finite_or_none(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
