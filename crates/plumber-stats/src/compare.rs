//! The model-versus-observation battery over a pair of time series.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;

use plumber_model::TimeSeries;

use crate::kernels;

/// Tunables for [`compare`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Quantile levels for the percentile-difference metrics.
    pub quantiles: Vec<f64>,
    /// Histogram bin count for the overlap statistic.
    pub bins: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            quantiles: vec![0.05, 0.95],
            bins: 25,
        }
    }
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quantiles(mut self, quantiles: Vec<f64>) -> Self {
        self.quantiles = quantiles;
        self
    }

    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }
}

/// Battery output: metric name to per-variable values.
#[derive(Debug, Clone, Default)]
pub struct ComparisonResult {
    metrics: BTreeMap<String, BTreeMap<String, f64>>,
    variables: Vec<String>,
}

impl ComparisonResult {
    /// Metric names in display order.
    pub fn metric_names(&self) -> impl Iterator<Item = &String> {
        self.metrics.keys()
    }

    /// The variables the battery ran over, sorted by name.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn get(&self, metric: &str, variable: &str) -> Option<f64> {
        self.metrics.get(metric)?.get(variable).copied()
    }

    pub fn metrics(&self) -> &BTreeMap<String, BTreeMap<String, f64>> {
        &self.metrics
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Run the full battery over the variables the two series share.
///
/// Variables are paired by name; anything present on only one side, the
/// time column, and non-numeric columns are skipped rather than erred, so
/// comparing a sparse model run against rich observations just narrows the
/// table. Lower is better for every metric: all of them are folded so that
/// identical series score zero.
pub fn compare(
    candidate: &TimeSeries,
    reference: &TimeSeries,
    options: &CompareOptions,
) -> Result<ComparisonResult> {
    let reference_vars: BTreeSet<String> = reference.numeric_variables().into_iter().collect();
    let candidate_vars: BTreeSet<String> = candidate.numeric_variables().into_iter().collect();
    let shared: Vec<String> = candidate_vars
        .intersection(&reference_vars)
        .cloned()
        .collect();

    let mut metrics: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for variable in &shared {
        let cand = candidate.column_f64(variable)?;
        let refer = reference.column_f64(variable)?;

        insert_metric(
            &mut metrics,
            "Absolute bias",
            variable,
            kernels::mean_bias_error(&cand, &refer),
        );
        insert_metric(
            &mut metrics,
            "1 - stdev ratio",
            variable,
            kernels::relative_standard_deviation(&cand, &refer),
        );
        insert_metric(
            &mut metrics,
            "1 - Correlation",
            variable,
            kernels::correlation_measure(&cand, &refer),
        );
        insert_metric(
            &mut metrics,
            "Normalized mean absolute error",
            variable,
            kernels::normalized_mean_error(&cand, &refer),
        );
        for q in &options.quantiles {
            insert_metric(
                &mut metrics,
                &percentile_metric_name(*q),
                variable,
                kernels::percentile_difference(&cand, &refer, *q),
            );
        }
        insert_metric(
            &mut metrics,
            "1 - skewness ratio",
            variable,
            kernels::relative_skewness(&cand, &refer),
        );
        insert_metric(
            &mut metrics,
            "1 - kurtosis ratio",
            variable,
            kernels::relative_kurtosis(&cand, &refer),
        );
        insert_metric(
            &mut metrics,
            "1 - overlap statistic",
            variable,
            1.0 - kernels::hist_overlap(&cand, &refer, options.bins),
        );
    }

    Ok(ComparisonResult {
        metrics,
        variables: shared,
    })
}

fn insert_metric(
    metrics: &mut BTreeMap<String, BTreeMap<String, f64>>,
    metric: &str,
    variable: &str,
    value: f64,
) {
    metrics
        .entry(metric.to_string())
        .or_default()
        .insert(variable.to_string(), value);
}

fn percentile_metric_name(q: f64) -> String {
    format!("Difference in {:.0}th percentile", q * 100.0)
}
