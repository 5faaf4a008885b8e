//! Reusable CLI components for the PLUMBER benchmark tool.

pub mod logging;
