//! Configuration for prevalence curation runs.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it changes. A couple of frequently tuned thresholds can also be
//! overridden from the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::algorithm::outlier::stats::QuartileMethod;
use crate::error::{CurationError, Result};

/// Environment variable overriding the tier 2/3 reliability threshold
pub const RELIABILITY_THRESHOLD_ENV: &str = "CURATION_RELIABILITY_THRESHOLD";

/// Environment variable overriding the high-confidence consensus threshold
pub const CONSENSUS_THRESHOLD_ENV: &str = "CURATION_CONSENSUS_THRESHOLD";

/// Configuration for a complete curation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    /// Class selection settings
    pub selection: SelectionConfig,
    /// Corpus-wide outlier analysis settings
    pub outliers: OutlierConfig,
    /// Whether to draw a progress bar during the per-disease pass
    pub show_progress: bool,
    /// Worker threads for the per-disease pass (defaults to the CPU count)
    pub worker_threads: Option<usize>,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            outliers: OutlierConfig::default(),
            show_progress: true,
            worker_threads: None,
        }
    }
}

/// Settings for the tiered class selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Minimum reliability score for the worldwide/regional fallback tiers
    pub reliability_threshold: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            reliability_threshold: 6.0,
        }
    }
}

/// Which per-disease value the outlier pass analyses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierValueSource {
    /// Reliability-weighted mean per million
    #[default]
    MeanValue,
    /// Per-million estimate of the selected class
    SelectedClass,
}

/// Lower/upper percentile pair, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBounds {
    /// Lower percentile
    pub lower: f64,
    /// Upper percentile
    pub upper: f64,
}

impl Default for PercentileBounds {
    fn default() -> Self {
        Self {
            lower: 5.0,
            upper: 95.0,
        }
    }
}

/// Thresholds for the domain-rule detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRuleConfig {
    /// Estimate (per million) above which weak support is suspicious
    pub high_estimate: f64,
    /// Reliability below which a high estimate is flagged
    pub low_reliability: f64,
    /// EU rare disease ceiling (5 in 10,000 = 500 per million)
    pub eu_limit: f64,
    /// Values known to be produced by processing defaults
    pub artifact_values: Vec<f64>,
}

impl Default for DomainRuleConfig {
    fn default() -> Self {
        Self {
            high_estimate: 100.0,
            low_reliability: 6.0,
            eu_limit: 500.0,
            artifact_values: vec![1000.0],
        }
    }
}

/// Settings for the corpus-wide outlier analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    /// One IQR strategy is run per multiplier; together they count as one vote
    pub iqr_multipliers: Vec<f64>,
    /// Quartile interpolation used by the IQR strategies
    pub quartile_method: QuartileMethod,
    /// Threshold for the raw z-score strategy
    pub zscore_threshold: f64,
    /// Threshold for the MAD-based modified z-score strategy
    pub modified_zscore_threshold: f64,
    /// Threshold for the log-space z-score strategy
    pub log_zscore_threshold: f64,
    /// Percentile strategy bounds
    pub percentile_bounds: PercentileBounds,
    /// Minimum number of agreeing strategy families for a high-confidence outlier
    pub high_consensus: usize,
    /// Minimum number of agreeing strategy families for a medium-confidence outlier
    pub medium_consensus: usize,
    /// Which per-disease value to analyse
    pub value_source: OutlierValueSource,
    /// Domain-rule thresholds
    pub domain: DomainRuleConfig,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            iqr_multipliers: vec![1.5, 2.0, 2.5, 3.0],
            quartile_method: QuartileMethod::Linear,
            zscore_threshold: 3.0,
            modified_zscore_threshold: 3.5,
            log_zscore_threshold: 3.0,
            percentile_bounds: PercentileBounds::default(),
            high_consensus: 4,
            medium_consensus: 2,
            value_source: OutlierValueSource::MeanValue,
            domain: DomainRuleConfig::default(),
        }
    }
}

impl CurationConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON configuration file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CurationError::io(path, e))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| CurationError::parse(path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides, ignoring values that do not parse
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(threshold) = env_value::<f64>(RELIABILITY_THRESHOLD_ENV) {
            self.selection.reliability_threshold = threshold;
        }
        if let Some(consensus) = env_value::<usize>(CONSENSUS_THRESHOLD_ENV) {
            self.outliers.high_consensus = consensus;
        }
        self
    }

    /// Check that the values are usable together
    pub fn validate(&self) -> Result<()> {
        let selection = &self.selection;
        if !(0.0..=10.0).contains(&selection.reliability_threshold) {
            return Err(CurationError::config(format!(
                "reliability_threshold must be within [0, 10], got {}",
                selection.reliability_threshold
            )));
        }

        let outliers = &self.outliers;
        if let Some(m) = outliers
            .iqr_multipliers
            .iter()
            .find(|m| !m.is_finite() || **m <= 0.0)
        {
            return Err(CurationError::config(format!(
                "IQR multipliers must be positive, got {m}"
            )));
        }

        for (name, value) in [
            ("zscore_threshold", outliers.zscore_threshold),
            ("modified_zscore_threshold", outliers.modified_zscore_threshold),
            ("log_zscore_threshold", outliers.log_zscore_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CurationError::config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let bounds = outliers.percentile_bounds;
        if !(0.0..=100.0).contains(&bounds.lower)
            || !(0.0..=100.0).contains(&bounds.upper)
            || bounds.lower >= bounds.upper
        {
            return Err(CurationError::config(format!(
                "percentile bounds must satisfy 0 <= lower < upper <= 100, got {}/{}",
                bounds.lower, bounds.upper
            )));
        }

        if outliers.medium_consensus == 0 || outliers.medium_consensus > outliers.high_consensus {
            return Err(CurationError::config(format!(
                "consensus thresholds must satisfy 0 < medium <= high, got {}/{}",
                outliers.medium_consensus, outliers.high_consensus
            )));
        }

        if self.worker_threads == Some(0) {
            return Err(CurationError::config("worker_threads must be at least 1"));
        }

        Ok(())
    }

    /// Number of worker threads for the per-disease pass
    #[must_use]
    pub fn effective_worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(num_cpus::get).max(1)
    }
}

fn env_value<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {name}={raw}: not a valid value");
            None
        }
    }
}

impl fmt::Display for CurationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.outliers;
        writeln!(f, "Curation Configuration:")?;
        writeln!(
            f,
            "  Reliability Threshold: {:.1}",
            self.selection.reliability_threshold
        )?;
        writeln!(f, "  IQR Multipliers: {:?}", o.iqr_multipliers)?;
        writeln!(f, "  Quartile Method: {:?}", o.quartile_method)?;
        writeln!(f, "  Z-score Threshold: {:.1}", o.zscore_threshold)?;
        writeln!(
            f,
            "  Modified Z-score Threshold: {:.1}",
            o.modified_zscore_threshold
        )?;
        writeln!(f, "  Log Z-score Threshold: {:.1}", o.log_zscore_threshold)?;
        writeln!(
            f,
            "  Percentile Bounds: {:.1}/{:.1}",
            o.percentile_bounds.lower, o.percentile_bounds.upper
        )?;
        writeln!(
            f,
            "  Consensus: high >= {}, medium >= {}",
            o.high_consensus, o.medium_consensus
        )?;
        writeln!(f, "  Outlier Value Source: {:?}", o.value_source)?;
        writeln!(f, "  Worker Threads: {}", self.effective_worker_threads())?;
        Ok(())
    }
}
