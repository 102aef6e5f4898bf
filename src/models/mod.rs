//! Domain models for prevalence curation
//!
//! This module contains the typed prevalence record, the canonical prevalence
//! class buckets, the input corpus, and the per-disease profile produced by
//! curation.

pub mod corpus;
pub mod prevalence_class;
pub mod profile;
pub mod record;

pub use corpus::{Corpus, DiseaseEntry};
pub use prevalence_class::PrevalenceClass;
pub use profile::{CalculationMethod, DiseasePrevalenceProfile, MeanCalculationMetadata, SelectionTier};
pub use record::{
    ConfidenceLevel, DataQualityIssue, EstimateSource, PrevalenceRecord, PrevalenceType,
    Qualification, RawPrevalenceRecord, ValidationStatus, WORLDWIDE,
};
