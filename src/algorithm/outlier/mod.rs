//! Corpus-wide outlier detection for curated prevalence estimates
//!
//! This module implements the outlier analysis run after every disease has
//! been curated. It includes:
//!
//! 1. A common `OutlierDetector` interface over a slice of per-disease values
//! 2. Statistical strategies (IQR family, z-score, modified z-score, log-space
//!    z-score, percentile thresholds)
//! 3. Domain rules for epidemiologically implausible estimates
//! 4. A consensus analyzer that counts how many strategies flag each disease
//!
//! Detectors never mutate the profiles they analyse and never panic on
//! degenerate input; they return an empty outlier set instead.

pub mod consensus;
pub mod domain;
pub mod iqr;
pub mod percentile;
pub mod stats;
pub mod zscore;

use serde::{Deserialize, Serialize};

pub use consensus::{ConsensusAnalyzer, ConsensusLevel, OutlierEntry, OutlierReport, StrategySummary};
pub use domain::{DomainObservation, DomainRule, DomainRuleDetector};
pub use iqr::IqrDetector;
pub use percentile::PercentileDetector;
pub use stats::QuartileMethod;
pub use zscore::{LogZScoreDetector, ModifiedZScoreDetector, ZScoreDetector};

/// Lower/upper bounds used by a strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Values below this are outliers
    pub lower: f64,
    /// Values above this are outliers
    pub upper: f64,
}

/// Output of one detector over a slice of values
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    /// Flagged values, in input order
    pub outliers: Vec<f64>,
    /// Input positions of the flagged values
    pub outlier_indices: Vec<usize>,
    /// Lower bound applied
    pub lower_bound: f64,
    /// Upper bound applied
    pub upper_bound: f64,
}

impl DetectionResult {
    /// Flag every finite value strictly outside `[lower, upper]`
    #[must_use]
    pub fn from_bounds(values: &[f64], lower: f64, upper: f64) -> Self {
        Self::from_predicate(values, lower, upper, |v| v < lower || v > upper)
    }

    /// Flag every finite value matching `is_outlier`, reporting the given bounds
    #[must_use]
    pub fn from_predicate(
        values: &[f64],
        lower: f64,
        upper: f64,
        is_outlier: impl Fn(f64) -> bool,
    ) -> Self {
        let outlier_indices: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite() && is_outlier(**v))
            .map(|(i, _)| i)
            .collect();
        Self {
            outliers: outlier_indices.iter().map(|&i| values[i]).collect(),
            outlier_indices,
            lower_bound: lower,
            upper_bound: upper,
        }
    }

    /// No outliers; bounds collapse to the observed range (0.0 for empty input)
    #[must_use]
    pub fn empty(values: &[f64]) -> Self {
        let (lower, upper) = stats::min_max(values).unwrap_or((0.0, 0.0));
        Self {
            outliers: Vec::new(),
            outlier_indices: Vec::new(),
            lower_bound: lower,
            upper_bound: upper,
        }
    }

    /// Bounds applied by the detector
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        Bounds {
            lower: self.lower_bound,
            upper: self.upper_bound,
        }
    }

    /// Whether nothing was flagged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outlier_indices.is_empty()
    }
}

/// A strategy flagging outliers in a corpus of per-disease values
pub trait OutlierDetector: Send + Sync {
    /// Strategy name used in flags and reports
    fn name(&self) -> String;

    /// Strategies sharing a family cast a single consensus vote
    fn family(&self) -> String {
        self.name()
    }

    /// Flag outliers among `values`
    fn detect(&self, values: &[f64]) -> DetectionResult;
}

/// Format a strategy parameter without a trailing `.0`
pub(crate) fn format_param(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
