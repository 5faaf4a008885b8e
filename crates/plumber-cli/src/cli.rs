//! CLI argument definitions for the PLUMBER benchmark tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "plumber",
    version,
    about = "PLUMBER land-surface model benchmark",
    long_about = "Ingest land-surface model output and flux-tower observations,\n\
                  normalize them onto a common half-hourly axis, and score the\n\
                  models against the observations."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Raise or lower log verbosity (-v debug, -vv trace, -q errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Send log output to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest everything a benchmark configuration names.
    Run(RunArgs),

    /// Show what a stored analysis holds without loading its tables.
    Inspect(InspectArgs),

    /// Score one source against a reference at a site.
    Compare(CompareArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the benchmark configuration (INI).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Restrict ingestion to these variables, comma separated (default: all).
    #[arg(long = "vars", value_name = "NAME", value_delimiter = ',')]
    pub vars: Vec<String>,

    /// Store the ingested analysis under this directory.
    #[arg(long = "store", value_name = "DIR")]
    pub store: Option<PathBuf>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Directory holding a stored analysis.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}

#[derive(Parser)]
pub struct CompareArgs {
    /// Directory holding a stored analysis.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Site to compare at.
    #[arg(long = "site", value_name = "SITE")]
    pub site: String,

    /// Source being scored, usually a model run.
    #[arg(long = "candidate", value_name = "SOURCE")]
    pub candidate: String,

    /// Source scored against, usually the observations.
    #[arg(long = "reference", value_name = "SOURCE")]
    pub reference: String,

    /// Histogram bin count for the overlap statistic.
    #[arg(long = "bins", value_name = "N", default_value_t = 25)]
    pub bins: usize,
}
