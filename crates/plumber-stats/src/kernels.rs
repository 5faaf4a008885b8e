//! Per-variable statistical kernels.
//!
//! Every kernel takes `&[f64]` with NaN standing in for missing samples.
//! Single-series statistics skip non-finite entries; paired kernels align
//! the two slices positionally and use only positions where both sides are
//! finite. Degenerate inputs (too few samples, zero spread) yield NaN
//! rather than an error, so a battery over many variables never aborts on
//! one bad column.
//!
//! The moment and quantile definitions match the ones the published
//! benchmark tables use: sample standard deviation (ddof = 1), adjusted
//! Fisher-Pearson skewness, adjusted excess kurtosis, and
//! linear-interpolation quantiles.

fn finite(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| v.is_finite())
}

fn paired(candidate: &[f64], reference: &[f64]) -> Vec<(f64, f64)> {
    candidate
        .iter()
        .zip(reference.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .collect()
}

/// Mean over the finite entries; NaN when none exist.
pub fn mean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in finite(values) {
        sum += value;
        count += 1;
    }
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// Sample standard deviation (ddof = 1); NaN below two finite entries.
pub fn std_dev(values: &[f64]) -> f64 {
    let center = mean(values);
    if !center.is_finite() {
        return f64::NAN;
    }
    let mut sum_sq = 0.0;
    let mut count = 0usize;
    for value in finite(values) {
        let dev = value - center;
        sum_sq += dev * dev;
        count += 1;
    }
    if count < 2 {
        f64::NAN
    } else {
        (sum_sq / (count - 1) as f64).sqrt()
    }
}

/// Absolute difference of the two means.
pub fn mean_bias_error(candidate: &[f64], reference: &[f64]) -> f64 {
    (mean(candidate) - mean(reference)).abs()
}

/// Ratio of the two sample standard deviations.
pub fn stdev_ratio(candidate: &[f64], reference: &[f64]) -> f64 {
    std_dev(candidate) / std_dev(reference)
}

/// `|1 - stdev ratio|`: zero when the spreads agree.
pub fn relative_standard_deviation(candidate: &[f64], reference: &[f64]) -> f64 {
    (1.0 - stdev_ratio(candidate, reference)).abs()
}

/// Pearson correlation over pairwise-finite positions.
pub fn correlation(candidate: &[f64], reference: &[f64]) -> f64 {
    let pairs = paired(candidate, reference);
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean_a = pairs.iter().map(|(a, _)| *a).sum::<f64>() / n as f64;
    let mean_b = pairs.iter().map(|(_, b)| *b).sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (a, b) in &pairs {
        let dev_a = a - mean_a;
        let dev_b = b - mean_b;
        cov += dev_a * dev_b;
        var_a += dev_a * dev_a;
        var_b += dev_b * dev_b;
    }
    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 { f64::NAN } else { cov / denom }
}

/// `1 - r`: zero for perfect positive correlation.
pub fn correlation_measure(candidate: &[f64], reference: &[f64]) -> f64 {
    1.0 - correlation(candidate, reference)
}

/// Summed absolute error normalized by the reference's summed absolute
/// deviation. A flat reference drives this to infinity.
pub fn normalized_mean_error(candidate: &[f64], reference: &[f64]) -> f64 {
    let pairs = paired(candidate, reference);
    if pairs.is_empty() {
        return f64::NAN;
    }
    let abs_err: f64 = pairs.iter().map(|(a, b)| (a - b).abs()).sum();
    let center = mean(reference);
    if !center.is_finite() {
        return f64::NAN;
    }
    let dev_sum: f64 = finite(reference).map(|value| (value - center).abs()).sum();
    abs_err / dev_sum
}

/// Quantile with linear interpolation between order statistics.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = finite(values).collect();
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let position = q * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    if below == above {
        return sorted[below];
    }
    let fraction = position - below as f64;
    sorted[below] + fraction * (sorted[above] - sorted[below])
}

/// Absolute difference of the two `q`-quantiles.
pub fn percentile_difference(candidate: &[f64], reference: &[f64], q: f64) -> f64 {
    (quantile(candidate, q) - quantile(reference, q)).abs()
}

/// Adjusted Fisher-Pearson skewness; NaN below three finite entries or for
/// a flat series.
pub fn skewness(values: &[f64]) -> f64 {
    let sample: Vec<f64> = finite(values).collect();
    let n = sample.len();
    if n < 3 {
        return f64::NAN;
    }
    let center = sample.iter().sum::<f64>() / n as f64;
    let m2 = sample.iter().map(|v| (v - center).powi(2)).sum::<f64>() / n as f64;
    let m3 = sample.iter().map(|v| (v - center).powi(3)).sum::<f64>() / n as f64;
    if m2 == 0.0 {
        return f64::NAN;
    }
    let g1 = m3 / m2.powf(1.5);
    let n = n as f64;
    g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
}

/// Adjusted excess kurtosis; NaN below four finite entries or for a flat
/// series. A normal distribution scores zero.
pub fn kurtosis(values: &[f64]) -> f64 {
    let sample: Vec<f64> = finite(values).collect();
    let n = sample.len();
    if n < 4 {
        return f64::NAN;
    }
    let center = sample.iter().sum::<f64>() / n as f64;
    let m2_sum = sample.iter().map(|v| (v - center).powi(2)).sum::<f64>();
    let m4_sum = sample.iter().map(|v| (v - center).powi(4)).sum::<f64>();
    let variance = m2_sum / (n - 1) as f64;
    if variance == 0.0 {
        return f64::NAN;
    }
    let n = n as f64;
    let lead = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    lead * m4_sum / variance.powi(2) - 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0))
}

/// Absolute difference of the two skewnesses.
pub fn skewness_difference(candidate: &[f64], reference: &[f64]) -> f64 {
    (skewness(candidate) - skewness(reference)).abs()
}

/// `|1 - skewness ratio|`.
pub fn relative_skewness(candidate: &[f64], reference: &[f64]) -> f64 {
    (1.0 - skewness(candidate) / skewness(reference)).abs()
}

/// Absolute difference of the two kurtoses.
pub fn kurtosis_difference(candidate: &[f64], reference: &[f64]) -> f64 {
    (kurtosis(candidate) - kurtosis(reference)).abs()
}

/// `|1 - kurtosis ratio|`.
pub fn relative_kurtosis(candidate: &[f64], reference: &[f64]) -> f64 {
    (1.0 - kurtosis(candidate) / kurtosis(reference)).abs()
}

/// Perkins histogram overlap: the shared area of the two distributions
/// binned over their joint range. One means identical distributions, zero
/// means disjoint; NaN when either side has no finite entries. The
/// normalizer is the candidate's finite count, so a series overlaps itself
/// exactly 1.0 whatever its gaps.
pub fn hist_overlap(candidate: &[f64], reference: &[f64], bins: usize) -> f64 {
    if bins == 0 {
        return f64::NAN;
    }
    let cand: Vec<f64> = finite(candidate).collect();
    let refer: Vec<f64> = finite(reference).collect();
    if cand.is_empty() || refer.is_empty() {
        return f64::NAN;
    }
    let lower = cand
        .iter()
        .chain(refer.iter())
        .copied()
        .fold(f64::INFINITY, f64::min);
    let upper = cand
        .iter()
        .chain(refer.iter())
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let cand_hist = histogram(&cand, lower, upper, bins);
    let ref_hist = histogram(&refer, lower, upper, bins);
    let shared: usize = cand_hist
        .iter()
        .zip(ref_hist.iter())
        .map(|(a, b)| (*a).min(*b))
        .sum();
    shared as f64 / cand.len() as f64
}

/// Equal-width counts over `[lower, upper]`; the top edge closes into the
/// last bin, and a zero-width range drops everything into it.
fn histogram(values: &[f64], lower: f64, upper: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    let span = upper - lower;
    for value in values {
        let index = if span == 0.0 {
            bins - 1
        } else {
            let scaled = ((value - lower) / span * bins as f64).floor() as usize;
            scaled.min(bins - 1)
        };
        counts[index] += 1;
    }
    counts
}
