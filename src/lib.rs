//! A Rust library for curating multi-source rare disease prevalence
//! observations into one authoritative estimate per disease, with
//! corpus-wide outlier detection.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{CurationConfig, OutlierConfig, OutlierValueSource, SelectionConfig};
pub use error::{CurationError, Result};
pub use models::{
    Corpus, DiseaseEntry, DiseasePrevalenceProfile, PrevalenceClass, PrevalenceRecord,
    SelectionTier,
};

// Curation
pub use algorithm::outlier::{ConsensusAnalyzer, OutlierDetector, OutlierReport};
pub use algorithm::prevalence::{CurationTally, curate_disease, select_prevalence_class, weighted_mean};
pub use pipeline::{CurationRun, PipelineOutput, curate_corpus, run_pipeline};

// Loading and persistence
pub use loader::{ResultView, load_corpus, load_corpus_async, write_outlier_report, write_results};
