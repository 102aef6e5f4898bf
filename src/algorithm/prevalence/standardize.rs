//! Class standardization
//!
//! Maps a prevalence bucket to a per-million point estimate, following the
//! midpoint-of-bucket convention, together with the bucket's range and a
//! confidence tag.

use serde::{Deserialize, Serialize};

use crate::models::prevalence_class::PrevalenceClass;
use crate::models::record::{ConfidenceLevel, EstimateSource, PrevalenceRecord};

/// Per-million value used for the open-ended `>1/1000` bucket.
///
/// Midpoint of the adjacent 1-9/1000 range rather than the 1000.0 floor.
/// Both readings exist in the literature and rank diseases differently; the
/// floor value is tracked as an artifact by the domain-rule detector.
pub const ABOVE_1_IN_1000_PER_MILLION: f64 = 5000.0;

/// Upper end of a bucket range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeMax {
    /// Finite upper bound (per million)
    Bounded(f64),
    /// Open-ended bucket
    Unlimited(UnlimitedMarker),
}

/// Serializes as the string `"unlimited"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlimitedMarker {
    /// No upper bound
    Unlimited,
}

/// Range of a bucket in cases per million
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassRange {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: RangeMax,
}

impl ClassRange {
    const fn bounded(min: f64, max: f64) -> Self {
        Self {
            min,
            max: RangeMax::Bounded(max),
        }
    }

    /// Whether the range has no upper bound
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        matches!(self.max, RangeMax::Unlimited(_))
    }
}

/// Standardized numeric view of a prevalence class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardizedClass {
    /// Point estimate per million, `None` for non-finite classes
    pub per_million_estimate: Option<f64>,
    /// Confidence in the estimate
    pub confidence_level: ConfidenceLevel,
    /// How the estimate was derived
    pub estimate_source: EstimateSource,
    /// Range covered by the bucket
    pub range: ClassRange,
}

/// Standardize a prevalence class
#[must_use]
pub const fn standardize(class: PrevalenceClass) -> StandardizedClass {
    let (estimate, confidence, source, range) = match class {
        PrevalenceClass::Above1In1000 => (
            Some(ABOVE_1_IN_1000_PER_MILLION),
            ConfidenceLevel::High,
            EstimateSource::ClassMidpoint,
            ClassRange {
                min: 1000.0,
                max: RangeMax::Unlimited(UnlimitedMarker::Unlimited),
            },
        ),
        PrevalenceClass::SixToNinePer10k => (
            Some(750.0),
            ConfidenceLevel::High,
            EstimateSource::ClassMidpoint,
            ClassRange::bounded(600.0, 900.0),
        ),
        PrevalenceClass::OneToFivePer10k => (
            Some(300.0),
            ConfidenceLevel::High,
            EstimateSource::ClassMidpoint,
            ClassRange::bounded(100.0, 500.0),
        ),
        PrevalenceClass::OneToNinePer100k => (
            Some(50.0),
            ConfidenceLevel::High,
            EstimateSource::ClassMidpoint,
            ClassRange::bounded(10.0, 90.0),
        ),
        PrevalenceClass::OneToNinePerMillion => (
            Some(5.0),
            ConfidenceLevel::High,
            EstimateSource::ClassMidpoint,
            ClassRange::bounded(1.0, 9.0),
        ),
        PrevalenceClass::BelowOnePerMillion => (
            Some(0.5),
            ConfidenceLevel::Medium,
            EstimateSource::ClassEstimate,
            ClassRange::bounded(0.0, 1.0),
        ),
        PrevalenceClass::Unknown | PrevalenceClass::NotYetDocumented => (
            None,
            ConfidenceLevel::None,
            EstimateSource::NoData,
            ClassRange::bounded(0.0, 0.0),
        ),
    };

    StandardizedClass {
        per_million_estimate: estimate,
        confidence_level: confidence,
        estimate_source: source,
        range,
    }
}

/// Per-million value of a class, 0.0 for non-finite classes
#[must_use]
pub fn per_million(class: PrevalenceClass) -> f64 {
    standardize(class).per_million_estimate.unwrap_or(0.0)
}

/// Standardize a record's class; a missing class standardizes as `Unknown`
#[must_use]
pub fn standardize_record(record: &PrevalenceRecord) -> StandardizedClass {
    standardize(record.class_or_unknown())
}
