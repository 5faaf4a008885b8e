use std::fs;
use std::path::Path;

use plumber_analysis::{Analysis, AnalysisError};
use plumber_model::VariableSelection;
use tempfile::tempdir;

const HALF_HOUR_MS: i64 = 30 * 60 * 1000;

fn write_station(path: &Path, offset_seconds: i64) {
    let text = format!(
        r#"{{
            "dims": {{"tstep": 4, "x": 1, "y": 1}},
            "variables": {{
                "tstep": {{
                    "dims": ["tstep"],
                    "values": [{}, {}, {}, {}],
                    "units": "seconds since 2002-01-01 00:00:00"
                }},
                "SWnet": {{"dims": ["tstep", "x", "y"], "values": [100.0, 110.0, 120.0, 130.0]}},
                "LWnet": {{"dims": ["tstep", "x", "y"], "values": [50.0, 51.0, 52.0, 53.0]}},
                "Qle": {{"dims": ["tstep", "x", "y"], "values": [5.0, 6.0, 7.0, 8.0]}}
            }}
        }}"#,
        offset_seconds,
        offset_seconds + 1800,
        offset_seconds + 3600,
        offset_seconds + 5400,
    );
    fs::write(path, text).unwrap();
}

fn write_benchmark_config(dir: &Path, data_dir: &Path) -> std::path::PathBuf {
    let text = format!(
        "[sites]\n\
         sites = Amplero, Tumba\n\
         \n\
         [sources]\n\
         models = CABLE\n\
         \n\
         [observations]\n\
         observations = Flux\n\
         \n\
         [filetemplates]\n\
         models_file_template = {root}/{{model}}_{{site}}.json\n\
         flux_file_template = {root}/Flux_{{site}}.json\n\
         \n\
         [tshifts]\n\
         cable = -30\n",
        root = data_dir.display()
    );
    let path = dir.join("benchmark.ini");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn the_config_contract_drives_a_full_ingest() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    for site in ["Amplero", "Tumba"] {
        write_station(&data_dir.join(format!("CABLE_{site}.json")), 1800);
        write_station(&data_dir.join(format!("Flux_{site}.json")), 0);
    }
    let config_path = write_benchmark_config(dir.path(), &data_dir);

    let mut analysis = Analysis::new(Some(&config_path)).unwrap();
    analysis.ingest_all(&VariableSelection::All).unwrap();

    assert_eq!(analysis.loaded_pair_count(), 4);
    for site in ["Amplero", "Tumba"] {
        assert!(analysis.series(site, "CABLE").is_some());
        assert!(analysis.series(site, "Flux").is_some());
    }

    // CABLE's -30 minute shift lines its axis up with the observations
    let model = analysis.series("Amplero", "CABLE").unwrap();
    let obs = analysis.series("Amplero", "Flux").unwrap();
    assert_eq!(
        model.time_epochs_ms().unwrap(),
        obs.time_epochs_ms().unwrap()
    );

    // everything sits on the half-hourly grid
    let epochs = model.time_epochs_ms().unwrap();
    assert!(epochs.windows(2).all(|w| w[1] - w[0] == HALF_HOUR_MS));
    assert_eq!(epochs[0] % HALF_HOUR_MS, 0);

    // net radiation was synthesized on both sides
    assert!(model.has_variable("Rnet"));
    assert!(obs.has_variable("Rnet"));
}

#[test]
fn a_variable_subset_narrows_every_table() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    for site in ["Amplero", "Tumba"] {
        write_station(&data_dir.join(format!("CABLE_{site}.json")), 0);
        write_station(&data_dir.join(format!("Flux_{site}.json")), 0);
    }
    let config_path = write_benchmark_config(dir.path(), &data_dir);

    let mut analysis = Analysis::new(Some(&config_path)).unwrap();
    analysis
        .ingest_all(&VariableSelection::subset(["Qle"]))
        .unwrap();

    let table = analysis.series("Tumba", "Flux").unwrap();
    assert_eq!(table.variables(), vec!["Qle"]);
}

#[test]
fn a_missing_file_aborts_the_walk_but_keeps_prior_pairs() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    // Amplero exists for the model, Tumba does not; no observation files
    write_station(&data_dir.join("CABLE_Amplero.json"), 0);
    let text = format!(
        "[sites]\nsites = Amplero, Tumba\n\
         [sources]\nmodels = CABLE\n\
         [filetemplates]\nmodels_file_template = {root}/{{model}}_{{site}}.json\n",
        root = data_dir.display()
    );
    let config_path = dir.path().join("benchmark.ini");
    fs::write(&config_path, text).unwrap();

    let mut analysis = Analysis::new(Some(&config_path)).unwrap();
    let err = analysis.ingest_all(&VariableSelection::All).unwrap_err();
    match &err {
        AnalysisError::Ingest { site, source_name, .. } => {
            assert_eq!(site, "Tumba");
            assert_eq!(source_name, "CABLE");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(analysis.series("Amplero", "CABLE").is_some());
    assert_eq!(analysis.loaded_pair_count(), 1);
}

#[test]
fn a_category_without_a_template_is_an_error() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("benchmark.ini");
    fs::write(
        &config_path,
        "[sites]\nsites = Amplero\n[sources]\nmodels = CABLE\n",
    )
    .unwrap();

    let mut analysis = Analysis::new(Some(&config_path)).unwrap();
    let err = analysis.ingest_all(&VariableSelection::All).unwrap_err();
    match err {
        AnalysisError::MissingTemplate { category } => assert_eq!(category, "models"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reingesting_a_pair_replaces_it_in_place() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("CABLE_Amplero.json");
    write_station(&path, 0);

    let mut analysis = Analysis::new(None).unwrap();
    analysis
        .ingest_one("Amplero", "CABLE", &path, &VariableSelection::All, None)
        .unwrap();
    write_station(&path, 7200);
    analysis
        .ingest_one("Amplero", "CABLE", &path, &VariableSelection::All, None)
        .unwrap();

    assert_eq!(analysis.loaded_pair_count(), 1);
    assert_eq!(analysis.manifest().sources("Amplero"), ["CABLE"]);
    let epochs = analysis
        .series("Amplero", "CABLE")
        .unwrap()
        .time_epochs_ms()
        .unwrap();
    // the replacement table's later axis is what remains
    assert_eq!(epochs[0] % HALF_HOUR_MS, 0);
    assert_eq!(epochs.len(), 4);
    assert_eq!(epochs[0], 1_009_843_200_000 + 7_200_000);
}
