//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Output is a compact single-line format on stderr by default. The level
//! comes from the CLI flags or the configuration's `[logging]` section, and
//! `RUST_LOG` overrides both when set.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter (error, warn, info, debug, trace).
    pub level: LevelFilter,
    /// Whether log lines carry timestamps.
    pub with_timestamps: bool,
    /// Whether log lines carry the emitting module path.
    pub with_target: bool,
    /// Whether to use ANSI colors in output.
    pub with_ansi: bool,
    /// Optional log file path. When set, logs are appended to the file.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
            with_timestamps: false,
            with_target: false,
            with_ansi: true,
            log_file: None,
        }
    }
}

/// Install the global tracing subscriber. Called once at startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            install(config, FileSink::new(file));
        }
        None => install(config, io::stderr),
    }
    Ok(())
}

fn install<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .compact()
        .with_writer(writer)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target);
    let registry = tracing_subscriber::registry().with(build_env_filter(config.level));
    if config.with_timestamps {
        registry.with(layer).init();
    } else {
        registry.with(layer.without_time()).init();
    }
}

/// `RUST_LOG` wins when present; otherwise the workspace crates log at the
/// configured level and everything else stays at warn.
fn build_env_filter(level: LevelFilter) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = level.to_string().to_lowercase();
    let mut directives = String::from("warn");
    for target in [
        "plumber_analysis",
        "plumber_cli",
        "plumber_ingest",
        "plumber_model",
        "plumber_stats",
    ] {
        directives.push_str(&format!(",{target}={level}"));
    }
    EnvFilter::new(directives)
}

/// Shared append handle on the log file; each event's write takes the lock.
#[derive(Clone)]
struct FileSink(Arc<Mutex<File>>);

impl FileSink {
    fn new(file: File) -> Self {
        Self(Arc::new(Mutex::new(file)))
    }

    fn locked(&self) -> io::Result<MutexGuard<'_, File>> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.locked()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.locked()?.flush()
    }
}

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = FileSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
