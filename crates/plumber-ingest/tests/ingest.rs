use std::fs;
use std::path::{Path, PathBuf};

use plumber_ingest::{IngestError, ingest};
use plumber_model::VariableSelection;
use tempfile::tempdir;

/// Epoch milliseconds of 2002-01-01T00:00:00Z, the origin used by the
/// fixtures below.
const ORIGIN_MS: i64 = 1_009_843_200_000;
const HALF_HOUR_MS: i64 = 30 * 60 * 1000;

fn write_fixture(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn station_dataset() -> &'static str {
    r#"{
        "dims": {"tstep": 3, "x": 1, "y": 1},
        "variables": {
            "tstep": {
                "dims": ["tstep"],
                "values": [0, 1800, 3600],
                "units": "seconds since 2002-01-01 00:00:00"
            },
            "SWnet": {"dims": ["tstep", "x", "y"], "values": [100.0, 110.0, 120.0], "units": "W/m2"},
            "LWnet": {"dims": ["tstep", "x", "y"], "values": [50.0, 51.0, 52.0], "units": "W/m2"},
            "Qle": {"dims": ["tstep", "x", "y"], "values": [5.0, null, 7.0], "units": "W/m2"},
            "Qh": {"dims": ["x", "y", "tstep"], "values": [9.0, 10.0, 11.0], "units": "W/m2"},
            "latitude": {"dims": ["y", "x"], "values": [-35.66], "units": "degrees_north"}
        }
    }"#
}

#[test]
fn station_dataset_becomes_a_half_hourly_frame() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "CABLE_Amplero.json", station_dataset());

    let series = ingest(&path, &VariableSelection::All, None).unwrap();
    assert_eq!(series.height(), 3);
    assert_eq!(
        series.time_epochs_ms().unwrap(),
        vec![
            ORIGIN_MS,
            ORIGIN_MS + HALF_HOUR_MS,
            ORIGIN_MS + 2 * HALF_HOUR_MS
        ]
    );

    let mut variables = series.variables();
    variables.sort();
    assert_eq!(
        variables,
        vec!["LWnet", "Qh", "Qle", "Rnet", "SWnet", "latitude"]
    );

    // net radiation synthesized from its operands
    assert_eq!(
        series.column_f64("Rnet").unwrap(),
        vec![150.0, 161.0, 172.0]
    );
    // a variable whose time axis is last still collapses per time step
    assert_eq!(series.column_f64("Qh").unwrap(), vec![9.0, 10.0, 11.0]);
    // a time-free variable broadcasts across the series
    assert_eq!(
        series.column_f64("latitude").unwrap(),
        vec![-35.66, -35.66, -35.66]
    );
    // nulls survive as missing values
    let qle = series.column_f64("Qle").unwrap();
    assert_eq!(qle[0], 5.0);
    assert!(qle[1].is_nan());
}

#[test]
fn selection_keeps_only_requested_variables() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "CABLE_Amplero.json", station_dataset());

    let selection = VariableSelection::subset(["Qle", "Rnet", "NotThere"]);
    let series = ingest(&path, &selection, None).unwrap();
    let mut variables = series.variables();
    variables.sort();
    // a requested variable the file lacks is silently absent
    assert_eq!(variables, vec!["Qle", "Rnet"]);
}

#[test]
fn net_radiation_is_skipped_when_an_operand_is_missing() {
    let dir = tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "obs.json",
        r#"{
            "dims": {"tstep": 2},
            "variables": {
                "tstep": {"dims": ["tstep"], "values": [0, 1800], "units": "seconds since 2002-01-01"},
                "SWnet": {"dims": ["tstep"], "values": [100.0, 110.0]}
            }
        }"#,
    );

    let series = ingest(&path, &VariableSelection::All, None).unwrap();
    assert!(!series.has_variable("Rnet"));
    assert!(series.has_variable("SWnet"));
}

#[test]
fn a_time_shift_moves_the_axis_before_decoding() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "CABLE_Amplero.json", station_dataset());

    let series = ingest(&path, &VariableSelection::All, Some(-30)).unwrap();
    let epochs = series.time_epochs_ms().unwrap();
    assert_eq!(epochs[0], ORIGIN_MS - HALF_HOUR_MS);
    assert_eq!(epochs[2], ORIGIN_MS + HALF_HOUR_MS);
}

#[test]
fn a_file_without_a_time_axis_is_rejected() {
    let dir = tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "broken.json",
        r#"{"dims": {"x": 1, "y": 2}, "variables": {}}"#,
    );

    let err = ingest(&path, &VariableSelection::All, None).unwrap_err();
    assert!(matches!(err, IngestError::NoTimeDimension { .. }));
}

#[test]
fn several_time_axes_are_rejected_with_candidates() {
    let dir = tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "broken.json",
        r#"{"dims": {"time": 1, "time_bnds": 2}, "variables": {}}"#,
    );

    let err = ingest(&path, &VariableSelection::All, None).unwrap_err();
    match err {
        IngestError::AmbiguousTimeDimension { candidates, .. } => {
            assert_eq!(candidates, vec!["time", "time_bnds"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn an_axis_without_units_is_rejected() {
    let dir = tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "broken.json",
        r#"{
            "dims": {"tstep": 1},
            "variables": {"tstep": {"dims": ["tstep"], "values": [0]}}
        }"#,
    );

    let err = ingest(&path, &VariableSelection::All, None).unwrap_err();
    assert!(matches!(err, IngestError::MissingTimeUnits { .. }));
}

#[test]
fn a_shape_mismatch_names_the_variable() {
    let dir = tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "broken.json",
        r#"{
            "dims": {"tstep": 3},
            "variables": {
                "tstep": {"dims": ["tstep"], "values": [0, 1800, 3600], "units": "seconds since 2002-01-01"},
                "Qle": {"dims": ["tstep"], "values": [1.0, 2.0]}
            }
        }"#,
    );

    let err = ingest(&path, &VariableSelection::All, None).unwrap_err();
    match err {
        IngestError::ShapeMismatch {
            variable,
            expected,
            actual,
            ..
        } => {
            assert_eq!(variable, "Qle");
            assert_eq!((expected, actual), (3, 2));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn csv_tables_land_on_the_same_grid() {
    let dir = tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "Flux_Amplero.csv",
        "time,Qle,site\n\
         2002-01-01 00:07:00,1.0,Amplero\n\
         2002-01-01 00:28:00,2.0,Amplero\n",
    );

    let series = ingest(&path, &VariableSelection::All, None).unwrap();
    assert_eq!(
        series.time_epochs_ms().unwrap(),
        vec![ORIGIN_MS, ORIGIN_MS + HALF_HOUR_MS]
    );
    assert_eq!(series.column_f64("Qle").unwrap(), vec![1.0, 2.0]);
    // non-numeric columns survive as all-missing rather than erroring
    assert!(series.has_variable("site"));
}

#[test]
fn csv_time_shifts_apply_after_parsing() {
    let dir = tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "Flux_Amplero.csv",
        "time,Qle\n2002-01-01 00:30:00,1.0\n2002-01-01 01:00:00,2.0\n",
    );

    let series = ingest(&path, &VariableSelection::All, Some(-30)).unwrap();
    assert_eq!(
        series.time_epochs_ms().unwrap(),
        vec![ORIGIN_MS, ORIGIN_MS + HALF_HOUR_MS]
    );
}

#[test]
fn unknown_extensions_are_rejected() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "data.nc", "not supported");

    let err = ingest(&path, &VariableSelection::All, None).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}

#[test]
fn missing_files_are_reported_as_such() {
    let dir = tempdir().unwrap();
    let err = ingest(
        &dir.path().join("absent.json"),
        &VariableSelection::All,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}
