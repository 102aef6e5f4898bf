//! Domain rules for epidemiologically implausible estimates
//!
//! Rare diseases are, by the EU definition, those affecting fewer than 5 in
//! 10,000 people (500 per million). High estimates backed by weak or single
//! observations, estimates above that ceiling, and values known to be emitted
//! by processing defaults are flagged for manual review.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::algorithm::outlier::{DetectionResult, OutlierDetector};
use crate::config::DomainRuleConfig;

/// Values within this distance of an artifact value count as equal to it
const ARTIFACT_TOLERANCE: f64 = 1e-9;

/// A violated domain rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainRule {
    /// High estimate with only low-reliability support
    LowReliabilityHighEstimate,
    /// High estimate backed by a single record
    SingleRecordHighEstimate,
    /// Estimate above the EU rare disease ceiling
    EuDefinitionBreach,
    /// Estimate equals a known processing default
    ArtificialCeiling,
}

impl DomainRule {
    /// Snake-case name used in reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowReliabilityHighEstimate => "low_reliability_high_estimate",
            Self::SingleRecordHighEstimate => "single_record_high_estimate",
            Self::EuDefinitionBreach => "eu_definition_breach",
            Self::ArtificialCeiling => "artificial_ceiling",
        }
    }
}

impl fmt::Display for DomainRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rules violated by one disease
pub type DomainViolations = SmallVec<[DomainRule; 4]>;

/// Per-disease facts the domain rules inspect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainObservation {
    /// Per-million estimate under analysis
    pub estimate: f64,
    /// Highest reliability among the supporting records
    pub max_reliability: f64,
    /// Number of records supporting the estimate
    pub supporting_records: usize,
}

/// Applies the domain rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainRuleDetector {
    /// Rule thresholds
    pub config: DomainRuleConfig,
}

impl DomainRuleDetector {
    /// Create a detector with the given thresholds
    #[must_use]
    pub const fn new(config: DomainRuleConfig) -> Self {
        Self { config }
    }

    /// Whether the estimate equals a known processing default
    #[must_use]
    pub fn is_artifact(&self, estimate: f64) -> bool {
        self.config
            .artifact_values
            .iter()
            .any(|a| (estimate - a).abs() <= ARTIFACT_TOLERANCE)
    }

    /// Rules violated by one observation.
    ///
    /// An artifact value reports only `ArtificialCeiling`: the number says
    /// nothing about the disease, so the other rules do not apply to it.
    #[must_use]
    pub fn evaluate(&self, observation: &DomainObservation) -> DomainViolations {
        let mut violations = DomainViolations::new();
        let estimate = observation.estimate;
        if !estimate.is_finite() {
            return violations;
        }

        if self.is_artifact(estimate) {
            violations.push(DomainRule::ArtificialCeiling);
            return violations;
        }

        let high = estimate > self.config.high_estimate;
        if high && observation.max_reliability < self.config.low_reliability {
            violations.push(DomainRule::LowReliabilityHighEstimate);
        }
        if high && observation.supporting_records == 1 {
            violations.push(DomainRule::SingleRecordHighEstimate);
        }
        if estimate > self.config.eu_limit {
            violations.push(DomainRule::EuDefinitionBreach);
        }
        violations
    }
}

impl OutlierDetector for DomainRuleDetector {
    fn name(&self) -> String {
        "domain_rules".to_string()
    }

    /// Value-only rules: the EU ceiling and artifact values
    fn detect(&self, values: &[f64]) -> DetectionResult {
        DetectionResult::from_predicate(values, 0.0, self.config.eu_limit, |v| {
            self.is_artifact(v) || v > self.config.eu_limit
        })
    }
}
