//! Percentile threshold strategy

use crate::algorithm::outlier::stats::{self, QuartileMethod};
use crate::algorithm::outlier::{DetectionResult, OutlierDetector, format_param};

/// Flags values strictly below the lower or above the upper percentile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileDetector {
    /// Lower percentile (0-100)
    pub lower_pct: f64,
    /// Upper percentile (0-100)
    pub upper_pct: f64,
    /// Interpolation used to compute the percentiles
    pub method: QuartileMethod,
}

impl PercentileDetector {
    /// Create a detector for the given percentile pair
    #[must_use]
    pub const fn new(lower_pct: f64, upper_pct: f64) -> Self {
        Self {
            lower_pct,
            upper_pct,
            method: QuartileMethod::Linear,
        }
    }
}

impl Default for PercentileDetector {
    fn default() -> Self {
        Self::new(5.0, 95.0)
    }
}

impl OutlierDetector for PercentileDetector {
    fn name(&self) -> String {
        format!(
            "percentile_{}_{}",
            format_param(self.lower_pct),
            format_param(self.upper_pct)
        )
    }

    fn detect(&self, values: &[f64]) -> DetectionResult {
        let sorted = stats::sorted_finite(values);
        let bounds = stats::quantile_sorted(&sorted, self.lower_pct / 100.0, self.method)
            .zip(stats::quantile_sorted(&sorted, self.upper_pct / 100.0, self.method));

        match bounds {
            Some((lower, upper)) => DetectionResult::from_bounds(values, lower, upper),
            None => DetectionResult::empty(values),
        }
    }
}
