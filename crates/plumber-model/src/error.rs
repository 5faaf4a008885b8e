//! Error types for configuration parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or interrogating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed INI syntax.
    #[error("failed to parse config {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    /// A `${section:key}` reference points at nothing, or never resolves.
    #[error("unresolvable reference ${{{reference}}} in [{section}] {key}")]
    Interpolation {
        section: String,
        key: String,
        reference: String,
    },

    /// A required section is absent.
    #[error("config section [{section}] not found")]
    MissingSection { section: String },

    /// A required key is absent from its section.
    #[error("config key '{key}' not found in section [{section}]")]
    MissingKey { section: String, key: String },

    /// A value exists but does not have the shape the caller asked for.
    #[error("config value [{section}] {key} is not {expected}")]
    WrongShape {
        section: String,
        key: String,
        expected: &'static str,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation_display_names_the_reference() {
        let err = ConfigError::Interpolation {
            section: "filetemplates".to_string(),
            key: "flux_file_template".to_string(),
            reference: "paths:missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unresolvable reference ${paths:missing} in [filetemplates] flux_file_template"
        );
    }
}
