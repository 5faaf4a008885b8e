//! Subcommand implementations.

use anyhow::{Context, Result};

use plumber_analysis::Analysis;
use plumber_model::{Config, VariableSelection};
use plumber_stats::CompareOptions;

use crate::cli::{CompareArgs, InspectArgs, RunArgs};
use crate::summary;

pub fn run(args: &RunArgs, config: Config) -> Result<Analysis> {
    let selection = selection_from(&args.vars);
    let mut analysis = Analysis::with_config(config, Some(args.config.clone()));
    analysis.ingest_all(&selection)?;
    if let Some(dir) = &args.store {
        analysis.store(dir)?;
        println!("Stored analysis under {}", dir.display());
    }
    Ok(analysis)
}

pub fn inspect(args: &InspectArgs) -> Result<()> {
    let analysis = Analysis::restore(&args.dir)?;
    summary::print_inspect(&analysis, &args.dir);
    Ok(())
}

pub fn compare(args: &CompareArgs) -> Result<()> {
    let mut analysis = Analysis::restore(&args.dir)?;
    analysis.restore_pair(&args.dir, &args.site, &args.candidate)?;
    analysis.restore_pair(&args.dir, &args.site, &args.reference)?;
    let candidate = analysis
        .series(&args.site, &args.candidate)
        .with_context(|| format!("no data for {}/{}", args.site, args.candidate))?;
    let reference = analysis
        .series(&args.site, &args.reference)
        .with_context(|| format!("no data for {}/{}", args.site, args.reference))?;

    let options = CompareOptions::default().with_bins(args.bins);
    let result = plumber_stats::compare(candidate, reference, &options)?;
    summary::print_comparison(&args.site, &args.candidate, &args.reference, &result);
    Ok(())
}

fn selection_from(vars: &[String]) -> VariableSelection {
    if vars.is_empty() || (vars.len() == 1 && vars[0].eq_ignore_ascii_case("all")) {
        VariableSelection::All
    } else {
        VariableSelection::subset(vars.iter().cloned())
    }
}
