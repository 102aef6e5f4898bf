//! Descriptive statistics used by the outlier strategies
//!
//! All helpers ignore non-finite values and return `None` instead of
//! panicking on empty input.

use serde::{Deserialize, Serialize};

/// Consistency constant relating MAD to the standard deviation of a normal
/// distribution, as used by the modified z-score.
pub const MAD_CONSISTENCY: f64 = 0.6745;

/// Quantile interpolation between the two order statistics around `q·(n−1)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuartileMethod {
    /// Linear interpolation
    #[default]
    Linear,
    /// Lower order statistic
    Lower,
    /// Higher order statistic
    Higher,
    /// Nearest order statistic, ties to even
    Nearest,
    /// Mean of the two order statistics
    Midpoint,
}

/// Finite values sorted ascending
#[must_use]
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile `q` in [0, 1] of already sorted data
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64, method: QuartileMethod) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let last = sorted.len() - 1;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lo = (position.floor() as usize).min(last);
    let hi = (position.ceil() as usize).min(last);

    let value = match method {
        QuartileMethod::Linear => {
            let fraction = position - lo as f64;
            sorted[lo] + fraction * (sorted[hi] - sorted[lo])
        }
        QuartileMethod::Lower => sorted[lo],
        QuartileMethod::Higher => sorted[hi],
        QuartileMethod::Nearest => sorted[(position.round_ties_even() as usize).min(last)],
        QuartileMethod::Midpoint => (sorted[lo] + sorted[hi]) / 2.0,
    };
    Some(value)
}

/// Quantile `q` in [0, 1] of unsorted data
#[must_use]
pub fn quantile(values: &[f64], q: f64, method: QuartileMethod) -> Option<f64> {
    quantile_sorted(&sorted_finite(values), q, method)
}

/// Median of the finite values
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5, QuartileMethod::Linear)
}

/// Arithmetic mean of the finite values
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean and population standard deviation of the finite values
#[must_use]
pub fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    let mu = mean(values)?;
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let variance =
        finite.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / finite.len() as f64;
    Some((mu, variance.sqrt()))
}

/// Median and median absolute deviation of the finite values
#[must_use]
pub fn median_and_mad(values: &[f64]) -> Option<(f64, f64)> {
    let center = median(values)?;
    let deviations: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| (v - center).abs())
        .collect();
    Some((center, median(&deviations)?))
}

/// Minimum and maximum of the finite values
#[must_use]
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Cap every value at the given lower/upper percentiles (0-100).
///
/// Non-finite values pass through unchanged.
#[must_use]
pub fn winsorize(values: &[f64], lower_pct: f64, upper_pct: f64) -> Vec<f64> {
    let sorted = sorted_finite(values);
    let bounds = quantile_sorted(&sorted, lower_pct / 100.0, QuartileMethod::Linear)
        .zip(quantile_sorted(&sorted, upper_pct / 100.0, QuartileMethod::Linear));

    match bounds {
        Some((lo, hi)) => values
            .iter()
            .map(|&v| if v.is_finite() { v.clamp(lo, hi) } else { v })
            .collect(),
        None => values.to_vec(),
    }
}
