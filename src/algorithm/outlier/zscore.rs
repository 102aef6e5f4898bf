//! Z-score strategies: raw, MAD-based (modified) and log-space

use crate::algorithm::outlier::stats::{self, MAD_CONSISTENCY};
use crate::algorithm::outlier::{DetectionResult, OutlierDetector, format_param};

/// Spreads at or below this are treated as zero
const SPREAD_EPSILON: f64 = 1e-12;

/// Flags values more than `threshold` population standard deviations from the mean
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScoreDetector {
    /// Absolute z-score above which a value is an outlier
    pub threshold: f64,
}

impl Default for ZScoreDetector {
    fn default() -> Self {
        Self { threshold: 3.0 }
    }
}

impl OutlierDetector for ZScoreDetector {
    fn name(&self) -> String {
        format!("zscore_{}", format_param(self.threshold))
    }

    fn detect(&self, values: &[f64]) -> DetectionResult {
        match stats::mean_and_std(values) {
            Some((mu, sigma)) if sigma > SPREAD_EPSILON => {
                let half_width = self.threshold * sigma;
                DetectionResult::from_predicate(values, mu - half_width, mu + half_width, |v| {
                    ((v - mu) / sigma).abs() > self.threshold
                })
            }
            _ => DetectionResult::empty(values),
        }
    }
}

/// Modified z-score `0.6745·(x − median)/MAD`, robust to skew
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifiedZScoreDetector {
    /// Absolute modified z-score above which a value is an outlier
    pub threshold: f64,
}

impl Default for ModifiedZScoreDetector {
    fn default() -> Self {
        Self { threshold: 3.5 }
    }
}

impl OutlierDetector for ModifiedZScoreDetector {
    fn name(&self) -> String {
        format!("modified_zscore_{}", format_param(self.threshold))
    }

    fn detect(&self, values: &[f64]) -> DetectionResult {
        match stats::median_and_mad(values) {
            Some((center, mad)) if mad > SPREAD_EPSILON => {
                let half_width = self.threshold * mad / MAD_CONSISTENCY;
                DetectionResult::from_predicate(
                    values,
                    center - half_width,
                    center + half_width,
                    |v| (MAD_CONSISTENCY * (v - center) / mad).abs() > self.threshold,
                )
            }
            _ => DetectionResult::empty(values),
        }
    }
}

/// Z-score computed on `ln(x + 1)`, suited to right-skewed prevalence values.
///
/// Values at or below −1 have no logarithm and are never flagged. Bounds are
/// reported back in the original scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogZScoreDetector {
    /// Absolute log-space z-score above which a value is an outlier
    pub threshold: f64,
}

impl Default for LogZScoreDetector {
    fn default() -> Self {
        Self { threshold: 3.0 }
    }
}

impl OutlierDetector for LogZScoreDetector {
    fn name(&self) -> String {
        format!("log_zscore_{}", format_param(self.threshold))
    }

    fn detect(&self, values: &[f64]) -> DetectionResult {
        let logged: Vec<f64> = values
            .iter()
            .map(|&v| if v > -1.0 { v.ln_1p() } else { f64::NAN })
            .collect();

        match stats::mean_and_std(&logged) {
            Some((mu, sigma)) if sigma > SPREAD_EPSILON => {
                let half_width = self.threshold * sigma;
                let mut result = DetectionResult::from_predicate(
                    &logged,
                    (mu - half_width).exp_m1(),
                    (mu + half_width).exp_m1(),
                    |v| ((v - mu) / sigma).abs() > self.threshold,
                );
                result.outliers = result.outlier_indices.iter().map(|&i| values[i]).collect();
                result
            }
            _ => DetectionResult::empty(values),
        }
    }
}
