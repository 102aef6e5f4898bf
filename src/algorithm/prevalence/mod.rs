//! Per-disease prevalence curation
//!
//! This module turns a disease's raw prevalence observations into a curated
//! profile. It includes:
//!
//! 1. Reliability scoring of each observation
//! 2. Class standardization to per-million estimates
//! 3. Tiered selection of the authoritative class
//! 4. A reliability-weighted mean as a continuous estimate
//! 5. Tallies and summaries over the curated corpus

pub mod curation;
pub mod reliability;
pub mod selection;
pub mod standardize;
pub mod statistics;
pub mod weighted_mean;

pub use curation::{DiseaseCuration, curate_disease, curate_records, parse_records};
pub use reliability::reliability_score;
pub use selection::{Selection, select_prevalence_class};
pub use standardize::{ClassRange, RangeMax, StandardizedClass, per_million, standardize};
pub use statistics::{CurationStatistics, CurationTally};
pub use weighted_mean::{WeightedMean, is_eligible, weighted_mean};
