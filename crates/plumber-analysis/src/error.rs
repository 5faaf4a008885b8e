//! Error types for analysis orchestration and persistence.

use std::path::PathBuf;

use thiserror::Error;

use plumber_ingest::IngestError;
use plumber_model::ConfigError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The configuration could not be parsed or lacks required entries.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// One source file failed to ingest; names the pair it was meant for.
    #[error("failed to ingest {site}/{source_name} from {path}")]
    Ingest {
        site: String,
        source_name: String,
        path: PathBuf,
        #[source]
        source: IngestError,
    },

    /// `[filetemplates]` lacks a template for this source category.
    #[error("no file template for category '{category}'")]
    MissingTemplate { category: String },

    /// Filesystem failure during persistence.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The structural unit could not be serialized.
    #[error("failed to serialize analysis state")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    /// The structural unit exists but is not valid.
    #[error("failed to parse analysis state from {path}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Stored state was written by a newer build.
    #[error("analysis state version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    /// The manifest names a pair whose data unit is gone.
    #[error("missing data unit for {site}/{source_name}: {path}")]
    MissingDataUnit {
        site: String,
        source_name: String,
        path: PathBuf,
    },

    /// A data unit exists but could not be decoded.
    #[error("failed to read data unit for {site}/{source_name} from {path}: {message}")]
    DataUnitRead {
        site: String,
        source_name: String,
        path: PathBuf,
        message: String,
    },

    /// A data unit could not be written.
    #[error("failed to write data unit for {site}/{source_name} to {path}: {message}")]
    DataUnitWrite {
        site: String,
        source_name: String,
        path: PathBuf,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
