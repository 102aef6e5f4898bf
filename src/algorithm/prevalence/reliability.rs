//! Reliability scoring for prevalence records
//!
//! Each record receives an additive quality score in [0, 10] built from its
//! validation status, source quality, qualification, measurement type and
//! geographic specificity. Unknown values contribute nothing.

use crate::models::record::{PrevalenceRecord, PrevalenceType, Qualification, ValidationStatus};

/// Upper bound of the reliability scale
pub const MAX_RELIABILITY: f64 = 10.0;

const VALIDATED_POINTS: f64 = 3.0;
const PMID_SOURCE_POINTS: f64 = 2.0;
const EXPERT_SOURCE_POINTS: f64 = 1.0;
const GEOGRAPHIC_POINTS: f64 = 1.0;

/// Points awarded for the validation status
#[must_use]
pub const fn validation_points(status: ValidationStatus) -> f64 {
    match status {
        ValidationStatus::Validated => VALIDATED_POINTS,
        ValidationStatus::NotYetValidated | ValidationStatus::Unknown => 0.0,
    }
}

/// Points awarded for the source reference.
///
/// A PubMed citation outranks an expert opinion when both markers are present.
#[must_use]
pub fn source_points(source: &str) -> f64 {
    let upper = source.to_uppercase();
    if upper.contains("[PMID]") || upper.contains("PMID:") {
        PMID_SOURCE_POINTS
    } else if upper.contains("[EXPERT]") || upper.contains("EXPERT OPINION") {
        EXPERT_SOURCE_POINTS
    } else {
        0.0
    }
}

/// Points awarded for the qualification
#[must_use]
pub const fn qualification_points(qualification: Qualification) -> f64 {
    match qualification {
        Qualification::ValueAndClass => 2.0,
        Qualification::ClassOnly => 1.0,
        Qualification::CaseReport | Qualification::Unknown => 0.0,
    }
}

/// Points awarded for the measurement type
#[must_use]
pub const fn type_points(prevalence_type: PrevalenceType) -> f64 {
    match prevalence_type {
        PrevalenceType::PointPrevalence => 2.0,
        PrevalenceType::BirthPrevalence => 1.8,
        PrevalenceType::AnnualIncidence => 1.5,
        PrevalenceType::CasesFamilies | PrevalenceType::LifetimePrevalence => 1.0,
        PrevalenceType::Unknown => 0.0,
    }
}

/// Compute the reliability score of a record, clipped to [0, 10]
#[must_use]
pub fn reliability_score(record: &PrevalenceRecord) -> f64 {
    let geographic = if record.is_geographically_specific() {
        GEOGRAPHIC_POINTS
    } else {
        0.0
    };

    let score = validation_points(record.validation_status)
        + source_points(&record.source)
        + qualification_points(record.qualification)
        + type_points(record.prevalence_type)
        + geographic;

    score.clamp(0.0, MAX_RELIABILITY)
}
