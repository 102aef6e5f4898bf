//! Input corpus: raw prevalence records grouped by disease
//!
//! Records are kept as JSON values until curation so that one malformed
//! record can be skipped without rejecting the disease or the corpus.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw input for one disease
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseEntry {
    /// Preferred disease name
    #[serde(default)]
    pub disease_name: String,
    /// Raw records, validated during curation
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
}

impl DiseaseEntry {
    /// Create an entry from a name and raw records
    #[must_use]
    pub fn new(disease_name: impl Into<String>, records: Vec<serde_json::Value>) -> Self {
        Self {
            disease_name: disease_name.into(),
            records,
        }
    }
}

/// Mapping `orpha_code → DiseaseEntry`, ordered by code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    diseases: BTreeMap<String, DiseaseEntry>,
}

impl Corpus {
    /// Create an empty corpus
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a disease
    pub fn insert(&mut self, orpha_code: impl Into<String>, entry: DiseaseEntry) {
        self.diseases.insert(orpha_code.into(), entry);
    }

    /// Look up a disease
    #[must_use]
    pub fn get(&self, orpha_code: &str) -> Option<&DiseaseEntry> {
        self.diseases.get(orpha_code)
    }

    /// Diseases in `orpha_code` order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&String, &DiseaseEntry)> {
        self.diseases.iter()
    }

    /// Number of diseases
    #[must_use]
    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    /// Whether the corpus has no diseases
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    /// Total number of raw records
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.diseases.values().map(|d| d.records.len()).sum()
    }
}

impl FromIterator<(String, DiseaseEntry)> for Corpus {
    fn from_iter<I: IntoIterator<Item = (String, DiseaseEntry)>>(iter: I) -> Self {
        Self {
            diseases: iter.into_iter().collect(),
        }
    }
}
