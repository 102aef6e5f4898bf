//! Per-disease prevalence profile
//!
//! A profile is built once per curation run from an immutable record list.
//! Only `outlier_flags` is filled in afterwards, by the corpus-wide outlier pass.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::prevalence_class::PrevalenceClass;
use crate::models::record::PrevalenceRecord;

/// Fallback tier that produced a disease's selected class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTier {
    /// Most reliable record overall is a point prevalence
    PointPrevalence,
    /// Most reliable worldwide point prevalence
    WorldwideFallback,
    /// Most reliable regional point prevalence
    RegionalFallback,
    /// Most reliable birth prevalence, converted one bucket down
    BirthPrevalenceFallback,
    /// Nothing usable
    NoData,
}

impl SelectionTier {
    /// All tiers in evaluation order
    pub const ALL: [Self; 5] = [
        Self::PointPrevalence,
        Self::WorldwideFallback,
        Self::RegionalFallback,
        Self::BirthPrevalenceFallback,
        Self::NoData,
    ];

    /// Snake-case name used in reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointPrevalence => "point_prevalence",
            Self::WorldwideFallback => "worldwide_fallback",
            Self::RegionalFallback => "regional_fallback",
            Self::BirthPrevalenceFallback => "birth_prevalence_fallback",
            Self::NoData => "no_data",
        }
    }
}

impl fmt::Display for SelectionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the mean per-million value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Reliability-weighted mean of eligible records
    ReliabilityWeightedMean,
    /// Arithmetic mean, used when all eligible weights are zero
    SimpleMeanFallback,
    /// No eligible records
    NoValidData,
}

impl CalculationMethod {
    /// Snake-case name used in reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReliabilityWeightedMean => "reliability_weighted_mean",
            Self::SimpleMeanFallback => "simple_mean_fallback",
            Self::NoValidData => "no_valid_data",
        }
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bookkeeping for the weighted mean of one disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanCalculationMetadata {
    /// Records that passed the eligibility filter
    pub valid_records_count: usize,
    /// Records considered before filtering
    pub total_records_count: usize,
    /// Method used
    pub calculation_method: CalculationMethod,
    /// Sum of reliability weights over eligible records
    pub weight_sum: f64,
}

impl MeanCalculationMetadata {
    /// Metadata for a disease without eligible records
    #[must_use]
    pub const fn no_valid_data(total_records_count: usize) -> Self {
        Self {
            valid_records_count: 0,
            total_records_count,
            calculation_method: CalculationMethod::NoValidData,
            weight_sum: 0.0,
        }
    }
}

/// Curated prevalence for one disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseasePrevalenceProfile {
    /// Orphanet disease identifier
    pub orpha_code: String,
    /// Preferred disease name
    pub disease_name: String,
    /// Annotated records the profile was built from
    pub records: Vec<PrevalenceRecord>,
    /// Authoritative class (`Unknown` when nothing could be selected)
    pub selected_class: PrevalenceClass,
    /// Tier that produced `selected_class`
    pub selection_tier: SelectionTier,
    /// Reliability-weighted mean per million (0.0 when no eligible data)
    pub mean_value_per_million: f64,
    /// How `mean_value_per_million` was computed
    pub mean_calculation_metadata: MeanCalculationMetadata,
    /// Outlier strategies that flagged this disease
    #[serde(default)]
    pub outlier_flags: Vec<String>,
}

impl DiseasePrevalenceProfile {
    /// Whether the weighted mean was backed by at least one eligible record
    #[must_use]
    pub const fn has_mean_data(&self) -> bool {
        self.mean_calculation_metadata.valid_records_count > 0
    }

    /// Highest reliability score among the profile's records
    #[must_use]
    pub fn max_reliability(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.reliability_score)
            .fold(0.0, f64::max)
    }
}
