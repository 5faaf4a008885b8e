//! Split persistence for an analysis.
//!
//! One structural unit, `analysis.json`, carries the schema version, the
//! configuration and its origin path, and the manifest. Each pair's table
//! lives beside it as `<site>_<source>.ipc` (Arrow IPC). Restoration is
//! two-phase: [`Analysis::restore`] reads only the structural unit, and
//! [`Analysis::restore_data`] or [`Analysis::restore_pair`] pull tables in
//! afterwards, so inspecting a large stored analysis stays cheap.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::{IpcReader, IpcWriter, SerReader, SerWriter};
use serde::{Deserialize, Serialize};
use tracing::info;

use plumber_model::{Config, TimeSeries};

use crate::analysis::Analysis;
use crate::error::{AnalysisError, Result};
use crate::manifest::Manifest;

/// Bump when the structural unit's layout changes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// File name of the structural unit inside a storage directory.
pub const STATE_FILE_NAME: &str = "analysis.json";

#[derive(Debug, Serialize, Deserialize)]
struct AnalysisState {
    schema_version: u32,
    config_path: Option<PathBuf>,
    config: Config,
    manifest: Manifest,
}

impl Analysis {
    /// Write the whole analysis under `dir`, overwriting existing units
    /// silently. Both the structural unit and every data unit go through a
    /// temp-file-and-rename so a crash cannot leave a half-written file
    /// behind.
    pub fn store(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| AnalysisError::Io {
            operation: "create directory",
            path: dir.to_path_buf(),
            source: e,
        })?;

        let state = AnalysisState {
            schema_version: CURRENT_SCHEMA_VERSION,
            config_path: self.config_path().map(Path::to_path_buf),
            config: self.config().clone(),
            manifest: self.manifest().clone(),
        };
        let bytes =
            serde_json::to_vec_pretty(&state).map_err(|e| AnalysisError::Serialize { source: e })?;
        write_atomic(&dir.join(STATE_FILE_NAME), &bytes)?;

        for (site, sources) in &self.data {
            for (source, series) in sources {
                write_data_unit(&data_unit_path(dir, site, source), site, source, series)?;
            }
        }
        info!(
            pairs = self.loaded_pair_count(),
            "Saved analysis to {}",
            dir.display()
        );
        Ok(())
    }

    /// Phase one of restoration: the structural unit only. The returned
    /// analysis knows every pair through its manifest but holds no tables.
    pub fn restore(dir: &Path) -> Result<Self> {
        let path = dir.join(STATE_FILE_NAME);
        let text = fs::read_to_string(&path).map_err(|e| AnalysisError::Io {
            operation: "read",
            path: path.clone(),
            source: e,
        })?;
        let state: AnalysisState =
            serde_json::from_str(&text).map_err(|e| AnalysisError::Deserialize {
                path: path.clone(),
                source: e,
            })?;
        if state.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(AnalysisError::UnsupportedVersion {
                found: state.schema_version,
                max_supported: CURRENT_SCHEMA_VERSION,
                path,
            });
        }
        info!("Restored analysis state from {}", path.display());

        let mut analysis = Analysis::with_config(state.config, state.config_path);
        analysis.manifest = state.manifest;
        analysis.restored_version = Some(state.schema_version);
        Ok(analysis)
    }

    /// Phase two: load every table the manifest names. A missing or
    /// unreadable unit is fatal and names its pair.
    pub fn restore_data(&mut self, dir: &Path) -> Result<()> {
        for (site, source) in self.manifest.pairs() {
            let series = read_data_unit(dir, &site, &source)?;
            self.data.entry(site).or_default().insert(source, series);
        }
        Ok(())
    }

    /// Load a single pair's table, recording the pair in the manifest if it
    /// was not there yet.
    pub fn restore_pair(&mut self, dir: &Path, site: &str, source: &str) -> Result<()> {
        let series = read_data_unit(dir, site, source)?;
        self.data
            .entry(site.to_string())
            .or_default()
            .insert(source.to_string(), series);
        self.manifest.record(site, source);
        Ok(())
    }
}

fn data_unit_path(dir: &Path, site: &str, source: &str) -> PathBuf {
    dir.join(format!("{site}_{source}.ipc"))
}

fn write_data_unit(path: &Path, site: &str, source: &str, series: &TimeSeries) -> Result<()> {
    let temp_path = path.with_extension("ipc.tmp");
    let mut file = File::create(&temp_path).map_err(|e| AnalysisError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    let mut frame = series.data().clone();
    IpcWriter::new(&mut file)
        .finish(&mut frame)
        .map_err(|e| AnalysisError::DataUnitWrite {
            site: site.to_string(),
            source_name: source.to_string(),
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    file.sync_all().map_err(|e| AnalysisError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;
    fs::rename(&temp_path, path).map_err(|e| AnalysisError::Io {
        operation: "rename",
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn read_data_unit(dir: &Path, site: &str, source: &str) -> Result<TimeSeries> {
    let path = data_unit_path(dir, site, source);
    if !path.exists() {
        return Err(AnalysisError::MissingDataUnit {
            site: site.to_string(),
            source_name: source.to_string(),
            path,
        });
    }
    let file = File::open(&path).map_err(|e| AnalysisError::Io {
        operation: "open",
        path: path.clone(),
        source: e,
    })?;
    let frame = IpcReader::new(file)
        .finish()
        .map_err(|e| AnalysisError::DataUnitRead {
            site: site.to_string(),
            source_name: source.to_string(),
            path: path.clone(),
            message: e.to_string(),
        })?;
    Ok(TimeSeries::new(frame))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|e| AnalysisError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(bytes).map_err(|e| AnalysisError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| AnalysisError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;
    fs::rename(&temp_path, path).map_err(|e| AnalysisError::Io {
        operation: "rename",
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
