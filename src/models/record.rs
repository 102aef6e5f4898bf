//! Prevalence record model
//!
//! A `PrevalenceRecord` is one prevalence observation for one disease, as
//! extracted from a source document. Raw string fields are validated into
//! enums at construction time; unrecognized values land in explicit
//! `Unknown` variants instead of being defaulted deep inside scoring logic.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::algorithm::prevalence::reliability::reliability_score;
use crate::algorithm::prevalence::standardize::standardize_record;
use crate::models::prevalence_class::PrevalenceClass;

/// Geographic area used for multinational or global observations
pub const WORLDWIDE: &str = "Worldwide";

/// Measurement type of a prevalence observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrevalenceType {
    /// Proportion of the living population currently affected
    PointPrevalence,
    /// Proportion of live births affected
    BirthPrevalence,
    /// New cases per year
    AnnualIncidence,
    /// Count of reported cases or families
    CasesFamilies,
    /// Proportion affected at any point during life
    LifetimePrevalence,
    /// Missing or unrecognized type
    Unknown,
}

impl From<&str> for PrevalenceType {
    fn from(s: &str) -> Self {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "point prevalence" => Self::PointPrevalence,
            "birth prevalence" => Self::BirthPrevalence,
            "annual incidence" | "incidence" => Self::AnnualIncidence,
            "cases/families" | "cases families" | "cases" => Self::CasesFamilies,
            "lifetime prevalence" => Self::LifetimePrevalence,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PrevalenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PointPrevalence => "Point prevalence",
            Self::BirthPrevalence => "Birth prevalence",
            Self::AnnualIncidence => "Annual incidence",
            Self::CasesFamilies => "Cases/families",
            Self::LifetimePrevalence => "Lifetime Prevalence",
            Self::Unknown => "Unknown",
        };
        write!(f, "{label}")
    }
}

/// How the observation was qualified by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualification {
    /// A numeric value accompanied by a class
    ValueAndClass,
    /// Only a class was given
    ClassOnly,
    /// Individual case reports
    CaseReport,
    /// Missing or unrecognized qualification
    Unknown,
}

impl From<&str> for Qualification {
    fn from(s: &str) -> Self {
        let normalized = s.trim().to_lowercase().replace('_', " ");
        match normalized.as_str() {
            "value and class" => Self::ValueAndClass,
            "class only" | "only class" => Self::ClassOnly,
            "case(s)" | "cases" | "case report" | "only cases" => Self::CaseReport,
            _ => Self::Unknown,
        }
    }
}

/// Curation status of the observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Validated by a curator
    Validated,
    /// Awaiting validation
    NotYetValidated,
    /// Missing or unrecognized status
    Unknown,
}

impl From<&str> for ValidationStatus {
    fn from(s: &str) -> Self {
        let normalized = s.trim().to_lowercase().replace('_', " ");
        match normalized.as_str() {
            "validated" => Self::Validated,
            "not yet validated" | "not validated" => Self::NotYetValidated,
            _ => Self::Unknown,
        }
    }
}

/// Confidence attached to a class-derived per-million estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Estimate is a bucket midpoint
    High,
    /// Estimate is a conventional stand-in with no midpoint to anchor it
    Medium,
    /// No usable estimate
    #[default]
    None,
}

/// Provenance of a per-million estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    /// Midpoint of a bucket (or of the adjacent bucket for `>1/1000`)
    ClassMidpoint,
    /// Conventional point estimate for an open-ended bucket
    ClassEstimate,
    /// No estimate available
    #[default]
    NoData,
}

/// Record shape as delivered by the record normalizer, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPrevalenceRecord {
    /// Source reference, may embed `[PMID]` or `[EXPERT]` markers
    #[serde(default)]
    pub source: Option<String>,
    /// Measurement type label
    #[serde(default, alias = "type")]
    pub prevalence_type: Option<String>,
    /// Prevalence class label
    #[serde(default, alias = "class")]
    pub prevalence_class: Option<String>,
    /// Qualification label
    #[serde(default)]
    pub qualification: Option<String>,
    /// Geographic area of the observation
    #[serde(default, alias = "geographic")]
    pub geographic_area: Option<String>,
    /// Validation status label
    #[serde(default)]
    pub validation_status: Option<String>,
}

/// Data-quality issue found while validating a raw record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataQualityIssue {
    /// The class label matched no canonical bucket and was treated as `Unknown`
    UnrecognizedClass(String),
    /// The type label matched no known measurement type
    UnrecognizedType(String),
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedClass(label) => {
                write!(f, "unrecognized prevalence class '{label}', treated as Unknown")
            }
            Self::UnrecognizedType(label) => {
                write!(f, "unrecognized prevalence type '{label}'")
            }
        }
    }
}

/// Issues collected while validating one record
pub type DataQualityIssues = SmallVec<[DataQualityIssue; 2]>;

/// A validated prevalence observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrevalenceRecord {
    /// Source reference
    pub source: String,
    /// Measurement type
    pub prevalence_type: PrevalenceType,
    /// Prevalence bucket, `None` when the source gave no class
    pub prevalence_class: Option<PrevalenceClass>,
    /// Source qualification
    pub qualification: Qualification,
    /// Geographic area (`"Worldwide"` for global observations)
    pub geographic_area: String,
    /// Curation status
    pub validation_status: ValidationStatus,
    /// Composite quality score in [0, 10]
    pub reliability_score: f64,
    /// Per-million estimate derived from the class
    pub per_million_estimate: Option<f64>,
    /// Confidence of the per-million estimate
    pub confidence_level: ConfidenceLevel,
    /// Provenance of the per-million estimate
    pub estimate_source: EstimateSource,
}

impl PrevalenceRecord {
    /// Create an unannotated record
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        prevalence_type: PrevalenceType,
        prevalence_class: Option<PrevalenceClass>,
        qualification: Qualification,
        geographic_area: impl Into<String>,
        validation_status: ValidationStatus,
    ) -> Self {
        Self {
            source: source.into(),
            prevalence_type,
            prevalence_class,
            qualification,
            geographic_area: geographic_area.into(),
            validation_status,
            reliability_score: 0.0,
            per_million_estimate: None,
            confidence_level: ConfidenceLevel::None,
            estimate_source: EstimateSource::NoData,
        }
    }

    /// Validate a raw record into typed fields, collecting data-quality issues
    #[must_use]
    pub fn from_raw(raw: &RawPrevalenceRecord) -> (Self, DataQualityIssues) {
        let mut issues = DataQualityIssues::new();

        let prevalence_type = match raw.prevalence_type.as_deref() {
            Some(label) => {
                let parsed = PrevalenceType::from(label);
                if parsed == PrevalenceType::Unknown {
                    issues.push(DataQualityIssue::UnrecognizedType(label.to_string()));
                }
                parsed
            }
            None => PrevalenceType::Unknown,
        };

        let prevalence_class = raw
            .prevalence_class
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .map(|label| {
                PrevalenceClass::parse(label).unwrap_or_else(|| {
                    issues.push(DataQualityIssue::UnrecognizedClass(label.to_string()));
                    PrevalenceClass::Unknown
                })
            });

        let record = Self::new(
            raw.source.as_deref().unwrap_or_default().trim(),
            prevalence_type,
            prevalence_class,
            raw.qualification
                .as_deref()
                .map_or(Qualification::Unknown, Qualification::from),
            raw.geographic_area.as_deref().unwrap_or_default().trim(),
            raw.validation_status
                .as_deref()
                .map_or(ValidationStatus::Unknown, ValidationStatus::from),
        );

        (record, issues)
    }

    /// Fill the computed fields from the reliability scorer and class standardizer.
    ///
    /// Idempotent: the computed fields depend only on the source fields.
    #[must_use]
    pub fn annotate(mut self) -> Self {
        let standardized = standardize_record(&self);
        self.reliability_score = reliability_score(&self);
        self.per_million_estimate = standardized.per_million_estimate;
        self.confidence_level = standardized.confidence_level;
        self.estimate_source = standardized.estimate_source;
        self
    }

    /// Whether the observation covers the whole world
    #[must_use]
    pub fn is_worldwide(&self) -> bool {
        self.geographic_area.eq_ignore_ascii_case(WORLDWIDE)
    }

    /// Whether the observation names a specific (non-worldwide) area
    #[must_use]
    pub fn is_geographically_specific(&self) -> bool {
        !self.geographic_area.is_empty() && !self.is_worldwide()
    }

    /// Class of the record, with a missing class read as `Unknown`
    #[must_use]
    pub fn class_or_unknown(&self) -> PrevalenceClass {
        self.prevalence_class.unwrap_or(PrevalenceClass::Unknown)
    }

    /// Whether the record has a class with a usable numeric range
    #[must_use]
    pub fn has_finite_class(&self) -> bool {
        self.prevalence_class.is_some_and(PrevalenceClass::is_finite)
    }
}
