//! Time-axis detection and decoding.
//!
//! Axes are found by name: any axis whose name contains "time"
//! (case-insensitive) is a candidate, and exactly one must match. Raw axis
//! values are decoded through a CF-style units string of the form
//! `"<unit> since <datetime>"` into epoch milliseconds.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::IngestError;

/// Pick the single axis whose name contains "time", case-insensitively.
///
/// Zero matches and multiple matches are both hard errors; guessing among
/// candidates would silently attach data to the wrong axis.
pub(crate) fn find_time_name<'a, I>(names: I, path: &Path) -> Result<String, IngestError>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    let mut candidates: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| name.to_lowercase().contains("time"))
        .collect();
    match candidates.len() {
        1 => Ok(candidates.remove(0).to_string()),
        0 => Err(IngestError::NoTimeDimension {
            path: path.to_path_buf(),
            dims: names.iter().map(|name| (*name).to_string()).collect(),
        }),
        _ => Err(IngestError::AmbiguousTimeDimension {
            path: path.to_path_buf(),
            candidates: candidates.iter().map(|name| (*name).to_string()).collect(),
        }),
    }
}

/// A parsed `"<unit> since <datetime>"` units string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    unit_ms: i64,
    origin_ms: i64,
}

impl TimeUnits {
    /// Parse a units string, returning `None` when the form is unknown.
    ///
    /// The unit word accepts seconds, minutes, hours and days along with
    /// their common abbreviations. The origin accepts `YYYY-MM-DD` with an
    /// optional `HH:MM[:SS[.fff]]` tail, `T` or space separated, and a
    /// trailing `Z`.
    pub fn parse(units: &str) -> Option<Self> {
        let lowered = units.to_lowercase();
        let marker = lowered.find(" since ")?;
        let unit_word = units.get(..marker)?.trim().to_lowercase();
        let unit_ms = match unit_word.as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1_000,
            "minutes" | "minute" | "mins" | "min" => 60_000,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600_000,
            "days" | "day" | "d" => 86_400_000,
            _ => return None,
        };
        let origin_text = units.get(marker + " since ".len()..)?.trim();
        let origin = parse_datetime(origin_text)?;
        Some(Self {
            unit_ms,
            origin_ms: origin.and_utc().timestamp_millis(),
        })
    }

    /// Decode one raw axis value to epoch milliseconds.
    ///
    /// Fractional values are honoured (for example half-days), rounded to
    /// the nearest millisecond.
    pub fn decode_ms(&self, raw: f64) -> i64 {
        self.origin_ms + (raw * self.unit_ms as f64).round() as i64
    }
}

/// Parse an ISO-like timestamp with a handful of tolerated layouts.
pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let mut cleaned = text.trim();
    if let Some(stripped) = cleaned.strip_suffix('Z') {
        cleaned = stripped.trim_end();
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
}

/// Parse an ISO-like timestamp straight to epoch milliseconds.
pub(crate) fn parse_timestamp_ms(text: &str) -> Option<i64> {
    parse_datetime(text).map(|stamp| stamp.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn finds_the_axis_by_substring() {
        let path = PathBuf::from("a.json");
        let found = find_time_name(["x", "tStep_Time", "y"], &path).unwrap();
        assert_eq!(found, "tStep_Time");
    }

    #[test]
    fn zero_candidates_is_an_error_listing_axes() {
        let path = PathBuf::from("a.json");
        let err = find_time_name(["x", "y"], &path).unwrap_err();
        assert!(matches!(err, IngestError::NoTimeDimension { .. }));
        assert!(err.to_string().contains('y'));
    }

    #[test]
    fn several_candidates_are_an_error_listing_them() {
        let path = PathBuf::from("a.json");
        let err = find_time_name(["time", "time_bnds", "x"], &path).unwrap_err();
        match err {
            IngestError::AmbiguousTimeDimension { candidates, .. } => {
                assert_eq!(candidates, vec!["time", "time_bnds"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decodes_seconds_since_an_origin() {
        let units = TimeUnits::parse("seconds since 2002-01-01 00:00:00").unwrap();
        let origin = units.decode_ms(0.0);
        assert_eq!(origin, 1_009_843_200_000);
        assert_eq!(units.decode_ms(1800.0), origin + 30 * 60 * 1000);
    }

    #[test]
    fn accepts_abbreviations_and_sparse_origins() {
        let hours = TimeUnits::parse("hrs since 2000-01-01").unwrap();
        assert_eq!(hours.decode_ms(1.0) - hours.decode_ms(0.0), 3_600_000);

        let days = TimeUnits::parse("days since 1850-1-1").unwrap();
        assert_eq!(days.decode_ms(1.0) - days.decode_ms(0.0), 86_400_000);
    }

    #[test]
    fn unknown_units_are_rejected() {
        assert!(TimeUnits::parse("fortnights since 2002-01-01").is_none());
        assert!(TimeUnits::parse("seconds").is_none());
        assert!(TimeUnits::parse("seconds since someday").is_none());
    }

    #[test]
    fn timestamps_parse_in_several_layouts() {
        let base = parse_timestamp_ms("2002-01-01 00:00:00").unwrap();
        assert_eq!(parse_timestamp_ms("2002-01-01T00:00:00Z"), Some(base));
        assert_eq!(parse_timestamp_ms("2002-01-01 00:00"), Some(base));
        assert_eq!(parse_timestamp_ms("2002-01-01"), Some(base));
        assert_eq!(parse_timestamp_ms("not a date"), None);
    }
}
