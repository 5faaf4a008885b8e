//! Terminal tables for run, inspect and compare output.

use std::path::Path;

use chrono::DateTime;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use plumber_analysis::Analysis;
use plumber_model::TimeSeries;
use plumber_stats::ComparisonResult;

pub fn print_run_summary(analysis: &Analysis) {
    if let Some(path) = analysis.config_path() {
        println!("Config: {}", path.display());
    }
    let mut table = styled_table(header_row(["Site", "Source", "Rows", "Variables", "Span"]));
    right_align(&mut table, [2, 3]);
    let mut total_rows = 0usize;
    for site in analysis.sites() {
        let Some(sources) = analysis.site_series(site) else {
            continue;
        };
        for (source, series) in sources {
            total_rows += series.height();
            table.add_row(vec![
                site_cell(site),
                Cell::new(source),
                Cell::new(series.height()),
                Cell::new(series.variables().len()),
                Cell::new(span_text(series)),
            ]);
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} pairs", analysis.loaded_pair_count()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        muted("-"),
        muted("-"),
    ]);
    println!("{table}");
}

pub fn print_inspect(analysis: &Analysis, dir: &Path) {
    println!("Storage: {}", dir.display());
    if let Some(path) = analysis.config_path() {
        println!("Config: {}", path.display());
    }
    if let Some(version) = analysis.restored_schema_version() {
        println!("Schema version: {version}");
    }
    let mut table = styled_table(header_row(["Site", "Sources"]));
    for site in analysis.manifest().sites() {
        table.add_row(vec![
            site_cell(site),
            Cell::new(analysis.manifest().sources(site).join(", ")),
        ]);
    }
    println!("{table}");
    println!("{} pairs on record", analysis.manifest().pair_count());
}

pub fn print_comparison(
    site: &str,
    candidate: &str,
    reference: &str,
    result: &ComparisonResult,
) {
    println!("Site: {site}  candidate: {candidate}  reference: {reference}");
    if result.is_empty() {
        println!("No shared variables to compare.");
        return;
    }
    let mut labels = vec!["Metric"];
    labels.extend(result.variables().iter().map(String::as_str));
    let mut table = styled_table(header_row(labels));
    right_align(&mut table, 1..=result.variables().len());
    for (metric, values) in result.metrics() {
        let mut row = vec![Cell::new(metric)];
        for variable in result.variables() {
            match values.get(variable) {
                Some(value) => row.push(metric_cell(*value)),
                None => row.push(muted("-")),
            }
        }
        table.add_row(row);
    }
    println!("{table}");
}

fn span_text(series: &TimeSeries) -> String {
    match series.time_bounds_ms() {
        Ok(Some((first, last))) => format!("{} .. {}", stamp_text(first), stamp_text(last)),
        _ => "-".to_string(),
    }
}

fn stamp_text(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(stamp) => stamp.naive_utc().format("%Y-%m-%d %H:%M").to_string(),
        None => epoch_ms.to_string(),
    }
}

fn metric_cell(value: f64) -> Cell {
    if value.is_finite() {
        Cell::new(format!("{value:.4}"))
    } else {
        muted(value)
    }
}

fn site_cell(site: &str) -> Cell {
    Cell::new(site).fg(Color::Blue).add_attribute(Attribute::Bold)
}

/// A fresh table with the house style and the given header already set.
fn styled_table(header: Vec<Cell>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    table.set_header(header);
    table
}

fn header_row<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<Cell> {
    labels
        .into_iter()
        .map(|label| Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

fn right_align(table: &mut Table, indexes: impl IntoIterator<Item = usize>) {
    for index in indexes {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn muted(text: impl ToString) -> Cell {
    Cell::new(text).fg(Color::DarkGrey)
}
