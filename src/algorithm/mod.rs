//! Algorithm implementations for prevalence curation
//!
//! This module contains the per-disease curation steps and the corpus-wide
//! outlier analysis that runs after them.

pub mod outlier;
pub mod prevalence;
