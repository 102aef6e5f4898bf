//! Interquartile range strategy

use crate::algorithm::outlier::stats::{self, QuartileMethod};
use crate::algorithm::outlier::{DetectionResult, OutlierDetector, format_param};

/// Tukey fences: `Q1 − m·IQR` and `Q3 + m·IQR`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrDetector {
    /// Fence multiplier (1.5 is the classic inner fence, 3.0 the outer)
    pub multiplier: f64,
    /// Quartile interpolation
    pub method: QuartileMethod,
}

impl IqrDetector {
    /// Create a detector with the given multiplier and linear quartiles
    #[must_use]
    pub const fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            method: QuartileMethod::Linear,
        }
    }

    /// Use a different quartile interpolation
    #[must_use]
    pub const fn with_method(mut self, method: QuartileMethod) -> Self {
        self.method = method;
        self
    }
}

impl Default for IqrDetector {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl OutlierDetector for IqrDetector {
    fn name(&self) -> String {
        format!("iqr_{}", format_param(self.multiplier))
    }

    fn family(&self) -> String {
        "iqr".to_string()
    }

    fn detect(&self, values: &[f64]) -> DetectionResult {
        let sorted = stats::sorted_finite(values);
        let quartiles = stats::quantile_sorted(&sorted, 0.25, self.method)
            .zip(stats::quantile_sorted(&sorted, 0.75, self.method));

        let Some((q1, q3)) = quartiles else {
            return DetectionResult::empty(values);
        };

        let iqr = q3 - q1;
        DetectionResult::from_bounds(
            values,
            q1 - self.multiplier * iqr,
            q3 + self.multiplier * iqr,
        )
    }
}
