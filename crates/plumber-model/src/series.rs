//! Time-series frame wrapper shared across the pipeline.

use polars::prelude::{AnyValue, DataFrame, DataType, PolarsError, PolarsResult, TimeUnit};

/// Canonical name of the time column. Every [`TimeSeries`] has it first.
pub const TIME_COLUMN: &str = "time";

/// A DataFrame whose first column is `time` (millisecond datetimes,
/// ascending) and whose remaining columns are variables.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    data: DataFrame,
}

impl TimeSeries {
    pub fn new(data: DataFrame) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DataFrame {
        &mut self.data
    }

    pub fn into_data(self) -> DataFrame {
        self.data
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    /// Column names other than `time`.
    pub fn variables(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != TIME_COLUMN)
            .map(|name| name.as_str().to_string())
            .collect()
    }

    /// Variables with a primitive numeric dtype; what the statistics engine
    /// pairs on.
    pub fn numeric_variables(&self) -> Vec<String> {
        self.data
            .get_columns()
            .iter()
            .filter(|column| column.name().as_str() != TIME_COLUMN)
            .filter(|column| is_numeric_dtype(column.dtype()))
            .map(|column| column.name().as_str().to_string())
            .collect()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        name != TIME_COLUMN && self.data.column(name).is_ok()
    }

    /// Extract a variable as `f64` values; nulls and non-numeric cells come
    /// back as NaN so downstream statistics can skip them positionally.
    pub fn column_f64(&self, name: &str) -> PolarsResult<Vec<f64>> {
        let column = self.data.column(name)?;
        let mut values = Vec::with_capacity(self.data.height());
        for idx in 0..self.data.height() {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            values.push(any_to_f64(value).unwrap_or(f64::NAN));
        }
        Ok(values)
    }

    /// The time axis as epoch milliseconds.
    pub fn time_epochs_ms(&self) -> PolarsResult<Vec<i64>> {
        time_epochs_ms(&self.data)
    }

    /// First and last timestamp, if any rows exist.
    pub fn time_bounds_ms(&self) -> PolarsResult<Option<(i64, i64)>> {
        let epochs = self.time_epochs_ms()?;
        match (epochs.first(), epochs.last()) {
            (Some(first), Some(last)) => Ok(Some((*first, *last))),
            _ => Ok(None),
        }
    }

    /// Value equality including null positions. Used to verify persistence
    /// round trips.
    pub fn same_contents(&self, other: &TimeSeries) -> bool {
        self.data.equals_missing(&other.data)
    }
}

/// Which variables an ingestion request wants kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VariableSelection {
    /// Keep every variable the file provides (plus anything derivable).
    #[default]
    All,
    /// Keep only the named variables; missing ones are skipped silently.
    Subset(Vec<String>),
}

impl VariableSelection {
    pub fn subset<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Subset(names.into_iter().map(Into::into).collect())
    }

    pub fn wants(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Subset(names) => names.iter().any(|wanted| wanted == name),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<Vec<String>> for VariableSelection {
    fn from(names: Vec<String>) -> Self {
        Self::Subset(names)
    }
}

/// Read the `time` column of a frame as epoch milliseconds.
pub fn time_epochs_ms(df: &DataFrame) -> PolarsResult<Vec<i64>> {
    let column = df.column(TIME_COLUMN)?;
    let mut epochs = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        match any_to_epoch_ms(value) {
            Some(ms) => epochs.push(ms),
            None => {
                return Err(PolarsError::ComputeError(
                    format!("time column holds a non-timestamp value at row {idx}").into(),
                ));
            }
        }
    }
    Ok(epochs)
}

/// Millisecond view of a timestamp-like cell. Plain `Int64` passes through
/// as already-milliseconds, which keeps test fixtures simple.
pub fn any_to_epoch_ms(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Datetime(raw, unit, _) => Some(unit_to_ms(raw, unit)),
        AnyValue::DatetimeOwned(raw, unit, _) => Some(unit_to_ms(raw, unit)),
        AnyValue::Int64(raw) => Some(raw),
        _ => None,
    }
}

fn unit_to_ms(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => value / 1_000_000,
        TimeUnit::Microseconds => value / 1_000,
        TimeUnit::Milliseconds => value,
    }
}

/// Numeric view of a cell; `None` for null or anything non-numeric.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// String view of a cell; empty for null.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "true" } else { "false" }.to_string(),
        other => other.to_string(),
    }
}

fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8
    )
}
