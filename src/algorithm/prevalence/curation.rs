//! Per-disease curation
//!
//! Validates a disease's raw records, annotates them with reliability scores
//! and standardized estimates, then runs the tiered selection and the
//! weighted mean. Each call is independent and returns its own tally.

use serde::Deserialize;

use crate::algorithm::prevalence::selection::select_prevalence_class;
use crate::algorithm::prevalence::statistics::CurationTally;
use crate::algorithm::prevalence::weighted_mean::weighted_mean;
use crate::config::SelectionConfig;
use crate::models::profile::DiseasePrevalenceProfile;
use crate::models::record::{PrevalenceRecord, RawPrevalenceRecord};
use crate::utils::logging::log_data_quality_warning;

/// Result of curating one disease
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseCuration {
    /// Curated profile, without outlier flags
    pub profile: DiseasePrevalenceProfile,
    /// Counts for this disease only
    pub tally: CurationTally,
}

/// Validate and annotate raw records, skipping malformed ones
pub fn parse_records(
    orpha_code: &str,
    raw_records: &[serde_json::Value],
    tally: &mut CurationTally,
) -> Vec<PrevalenceRecord> {
    let mut records = Vec::with_capacity(raw_records.len());
    for (index, value) in raw_records.iter().enumerate() {
        let raw = match RawPrevalenceRecord::deserialize(value) {
            Ok(raw) => raw,
            Err(e) => {
                log_data_quality_warning(
                    orpha_code,
                    format!("skipping malformed record {index}: {e}"),
                );
                tally.skipped_records += 1;
                continue;
            }
        };

        let (record, issues) = PrevalenceRecord::from_raw(&raw);
        for issue in &issues {
            log_data_quality_warning(orpha_code, issue);
        }
        tally.data_quality_warnings += issues.len();
        records.push(record.annotate());
    }
    records
}

/// Build a profile from typed records.
///
/// Records are (re-)annotated, so callers may pass freshly validated ones.
#[must_use]
pub fn curate_records(
    orpha_code: &str,
    disease_name: &str,
    records: Vec<PrevalenceRecord>,
    config: &SelectionConfig,
) -> DiseasePrevalenceProfile {
    let records: Vec<PrevalenceRecord> = records.into_iter().map(PrevalenceRecord::annotate).collect();
    let selection = select_prevalence_class(&records, config);
    let mean = weighted_mean(&records);

    DiseasePrevalenceProfile {
        orpha_code: orpha_code.to_string(),
        disease_name: disease_name.to_string(),
        records,
        selected_class: selection.class,
        selection_tier: selection.tier,
        mean_value_per_million: mean.mean_value_per_million,
        mean_calculation_metadata: mean.metadata,
        outlier_flags: Vec::new(),
    }
}

/// Curate one disease from its raw records
#[must_use]
pub fn curate_disease(
    orpha_code: &str,
    disease_name: &str,
    raw_records: &[serde_json::Value],
    config: &SelectionConfig,
) -> DiseaseCuration {
    let mut tally = CurationTally::default();
    let records = parse_records(orpha_code, raw_records, &mut tally);
    let profile = curate_records(orpha_code, disease_name, records, config);
    tally.record_profile(&profile);

    log::debug!(
        "ORPHA:{orpha_code} -> {} via {} (mean {:.2}/M from {} records)",
        profile.selected_class,
        profile.selection_tier,
        profile.mean_value_per_million,
        profile.mean_calculation_metadata.valid_records_count
    );

    DiseaseCuration { profile, tally }
}
