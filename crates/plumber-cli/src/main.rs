//! PLUMBER benchmark CLI.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use plumber_cli::logging::{LogConfig, init_logging};
use plumber_model::{Config, ConfigValue};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    // The run configuration can carry a [logging] section, so it has to be
    // parsed before the subscriber goes up.
    let run_config = match &cli.command {
        Command::Run(args) => match Config::parse(&args.config) {
            Ok(config) => Some(config),
            Err(error) => {
                eprintln!("error: {error}");
                std::process::exit(1);
            }
        },
        _ => None,
    };
    let log_config = build_log_config(&cli, run_config.as_ref());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Run(args) => {
            let config = run_config.unwrap_or_else(Config::empty);
            match commands::run(&args, config) {
                Ok(analysis) => {
                    summary::print_run_summary(&analysis);
                    0
                }
                Err(error) => {
                    eprintln!("error: {error:#}");
                    1
                }
            }
        }
        Command::Inspect(args) => match commands::inspect(&args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Compare(args) => match commands::compare(&args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Build logging configuration with consistent precedence: explicit -v/-q
/// flags beat the configuration's `[logging]` section, which beats the
/// defaults. `RUST_LOG` trumps all of it later in the filter itself.
fn build_log_config(cli: &Cli, run_config: Option<&Config>) -> LogConfig {
    let mut config = LogConfig::default();
    if let Some(parsed) = run_config {
        if let Some(path) = parsed
            .get("logging", "logfile")
            .and_then(ConfigValue::as_str)
        {
            // A file target without an explicit loglevel captures info.
            config.log_file = Some(PathBuf::from(path));
            config.level = LevelFilter::INFO;
        }
        if let Some(level) = parsed
            .get("logging", "loglevel")
            .and_then(ConfigValue::as_str)
            && let Ok(level) = level.parse::<LevelFilter>()
        {
            config.level = level;
        }
    }
    if cli.verbosity.is_present() {
        config.level = cli.verbosity.tracing_level_filter();
    }
    if let Some(path) = &cli.log_file {
        config.log_file = Some(path.clone());
    }
    config.with_ansi = config.log_file.is_none() && io::stderr().is_terminal();
    config
}
