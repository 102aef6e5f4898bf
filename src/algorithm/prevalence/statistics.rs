//! Curation statistics and summaries
//!
//! Each per-disease curation returns its own `CurationTally`; the caller
//! merges them after the parallel pass. No counters are shared between
//! diseases.

use rustc_hash::FxHashMap;

use crate::algorithm::outlier::{ConsensusLevel, OutlierReport};
use crate::models::prevalence_class::PrevalenceClass;
use crate::models::profile::{CalculationMethod, DiseasePrevalenceProfile, SelectionTier};

/// Counts accumulated while curating one or more diseases
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurationTally {
    /// Diseases curated
    pub diseases: usize,
    /// Records that validated into typed records
    pub records: usize,
    /// Malformed records skipped
    pub skipped_records: usize,
    /// Data-quality warnings emitted
    pub data_quality_warnings: usize,
    /// Diseases per selection tier
    pub tier_counts: FxHashMap<SelectionTier, usize>,
    /// Diseases per selected class
    pub class_counts: FxHashMap<PrevalenceClass, usize>,
    /// Diseases per mean calculation method
    pub method_counts: FxHashMap<CalculationMethod, usize>,
}

impl CurationTally {
    /// Count one curated profile
    pub fn record_profile(&mut self, profile: &DiseasePrevalenceProfile) {
        self.diseases += 1;
        self.records += profile.records.len();
        *self.tier_counts.entry(profile.selection_tier).or_insert(0) += 1;
        *self.class_counts.entry(profile.selected_class).or_insert(0) += 1;
        *self
            .method_counts
            .entry(profile.mean_calculation_metadata.calculation_method)
            .or_insert(0) += 1;
    }

    /// Fold another tally into this one
    pub fn merge(&mut self, other: Self) {
        self.diseases += other.diseases;
        self.records += other.records;
        self.skipped_records += other.skipped_records;
        self.data_quality_warnings += other.data_quality_warnings;
        for (tier, count) in other.tier_counts {
            *self.tier_counts.entry(tier).or_insert(0) += count;
        }
        for (class, count) in other.class_counts {
            *self.class_counts.entry(class).or_insert(0) += count;
        }
        for (method, count) in other.method_counts {
            *self.method_counts.entry(method).or_insert(0) += count;
        }
    }

    /// Merge two tallies, for use as a reduction
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.merge(other);
        self
    }

    /// Diseases resolved by a given tier
    #[must_use]
    pub fn tier_count(&self, tier: SelectionTier) -> usize {
        self.tier_counts.get(&tier).copied().unwrap_or(0)
    }

    /// Diseases assigned a given class
    #[must_use]
    pub fn class_count(&self, class: PrevalenceClass) -> usize {
        self.class_counts.get(&class).copied().unwrap_or(0)
    }

    /// Diseases whose mean used a given method
    #[must_use]
    pub fn method_count(&self, method: CalculationMethod) -> usize {
        self.method_counts.get(&method).copied().unwrap_or(0)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Functions for curation summaries
pub struct CurationStatistics;

impl CurationStatistics {
    /// Generate a human-readable curation summary
    #[must_use]
    pub fn generate_summary(tally: &CurationTally, report: Option<&OutlierReport>) -> String {
        let total = tally.diseases;
        let mut summary = String::new();
        summary.push_str("Prevalence Curation Summary:\n");
        summary.push_str(&format!("  Diseases Curated: {total}\n"));
        summary.push_str(&format!("  Records Used: {}\n", tally.records));
        summary.push_str(&format!("  Malformed Records Skipped: {}\n", tally.skipped_records));
        summary.push_str(&format!(
            "  Data Quality Warnings: {}\n",
            tally.data_quality_warnings
        ));

        summary.push_str("\nSelection Tiers:\n");
        for tier in SelectionTier::ALL {
            let count = tally.tier_count(tier);
            summary.push_str(&format!(
                "  {tier}: {count} ({:.1}%)\n",
                percentage(count, total)
            ));
        }

        summary.push_str("\nSelected Classes:\n");
        for class in PrevalenceClass::ALL {
            let count = tally.class_count(class);
            if count > 0 {
                summary.push_str(&format!(
                    "  {class}: {count} ({:.1}%)\n",
                    percentage(count, total)
                ));
            }
        }

        let with_mean = total - tally.method_count(CalculationMethod::NoValidData);
        summary.push_str("\nWeighted Mean Coverage:\n");
        summary.push_str(&format!(
            "  Diseases with Mean: {with_mean} ({:.1}%)\n",
            percentage(with_mean, total)
        ));
        summary.push_str(&format!(
            "  Simple Mean Fallbacks: {}\n",
            tally.method_count(CalculationMethod::SimpleMeanFallback)
        ));

        if let Some(report) = report {
            summary.push_str("\nOutlier Analysis:\n");
            summary.push_str(&format!("  Diseases Analyzed: {}\n", report.analyzed_diseases));
            summary.push_str(&format!("  Diseases Flagged: {}\n", report.entries.len()));
            summary.push_str(&format!(
                "  High Confidence: {}\n",
                report.at_level(ConsensusLevel::High).len()
            ));
            summary.push_str(&format!(
                "  Medium Confidence: {}\n",
                report.at_level(ConsensusLevel::Medium).len()
            ));
            summary.push_str(&format!(
                "  Processing Artifacts: {}\n",
                report.artifacts().len()
            ));
        }

        summary
    }
}
