//! Orchestration of a PLUMBER benchmark run: bulk ingestion driven by the
//! configuration contract, and split persistence of the result.

pub mod analysis;
pub mod error;
pub mod manifest;
pub mod persist;

pub use analysis::Analysis;
pub use error::{AnalysisError, Result};
pub use manifest::Manifest;
pub use persist::{CURRENT_SCHEMA_VERSION, STATE_FILE_NAME};
