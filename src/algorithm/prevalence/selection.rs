//! Tiered selection of a disease's authoritative prevalence class
//!
//! Tiers are evaluated in order and the first one that produces a class wins:
//!
//! 1. `point_prevalence`: the most reliable record overall is a point prevalence
//! 2. `worldwide_fallback`: the most reliable worldwide record
//! 3. `regional_fallback`: the most reliable regional record
//! 4. `birth_prevalence_fallback`: the most reliable birth prevalence, one bucket down
//! 5. `no_data`
//!
//! Tiers 2 and 3 consider records with a finite class scoring at least the
//! reliability threshold, relaxing to all such records when none reaches it.
//! Birth prevalences are left to tier 4 and case counts never select a class.

use std::cmp::Ordering;

use crate::algorithm::prevalence::reliability::{type_points, validation_points};
use crate::config::SelectionConfig;
use crate::models::prevalence_class::PrevalenceClass;
use crate::models::profile::SelectionTier;
use crate::models::record::{PrevalenceRecord, PrevalenceType};

/// Outcome of the tiered selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Selected class (`Unknown` for `no_data`)
    pub class: PrevalenceClass,
    /// Tier that produced the class
    pub tier: SelectionTier,
}

impl Selection {
    /// Selection used when no tier produced a class
    pub const NO_DATA: Self = Self {
        class: PrevalenceClass::Unknown,
        tier: SelectionTier::NoData,
    };

    const fn new(class: PrevalenceClass, tier: SelectionTier) -> Self {
        Self { class, tier }
    }
}

/// Preference order between two records, greater is better.
///
/// Ties on reliability are broken on the record's own fields so the winner
/// does not depend on input order.
fn preference(a: &PrevalenceRecord, b: &PrevalenceRecord) -> Ordering {
    a.reliability_score
        .total_cmp(&b.reliability_score)
        .then_with(|| type_points(a.prevalence_type).total_cmp(&type_points(b.prevalence_type)))
        .then_with(|| {
            validation_points(a.validation_status).total_cmp(&validation_points(b.validation_status))
        })
        .then_with(|| b.class_or_unknown().cmp(&a.class_or_unknown()))
        .then_with(|| b.geographic_area.cmp(&a.geographic_area))
        .then_with(|| b.source.cmp(&a.source))
}

/// Most preferred record, if any
fn most_reliable<'a>(records: impl Iterator<Item = &'a PrevalenceRecord>) -> Option<&'a PrevalenceRecord> {
    records.max_by(|a, b| preference(a, b))
}

fn is_fallback_candidate(record: &PrevalenceRecord) -> bool {
    !matches!(
        record.prevalence_type,
        PrevalenceType::BirthPrevalence | PrevalenceType::CasesFamilies
    ) && record.has_finite_class()
}

/// Select the authoritative class for one disease from its annotated records
#[must_use]
pub fn select_prevalence_class(records: &[PrevalenceRecord], config: &SelectionConfig) -> Selection {
    // Tier 1
    let top = most_reliable(records.iter());
    if let Some(top) = top.filter(|r| r.prevalence_type == PrevalenceType::PointPrevalence) {
        return Selection::new(top.class_or_unknown(), SelectionTier::PointPrevalence);
    }

    // Tiers 2 and 3 share the thresholded pool
    let candidates: Vec<&PrevalenceRecord> = records
        .iter()
        .filter(|r| is_fallback_candidate(r))
        .collect();
    let reliable: Vec<&PrevalenceRecord> = candidates
        .iter()
        .copied()
        .filter(|r| r.reliability_score >= config.reliability_threshold)
        .collect();
    let pool = if reliable.is_empty() { candidates } else { reliable };

    if let Some(record) = most_reliable(pool.iter().copied().filter(|r| r.is_worldwide())) {
        return Selection::new(record.class_or_unknown(), SelectionTier::WorldwideFallback);
    }
    if let Some(record) = most_reliable(pool.iter().copied().filter(|r| !r.is_worldwide())) {
        return Selection::new(record.class_or_unknown(), SelectionTier::RegionalFallback);
    }

    // Tier 4
    let birth = most_reliable(
        records
            .iter()
            .filter(|r| r.prevalence_type == PrevalenceType::BirthPrevalence),
    );
    if let Some(record) = birth {
        let converted = record.class_or_unknown().birth_to_point();
        if converted != PrevalenceClass::Unknown {
            return Selection::new(converted, SelectionTier::BirthPrevalenceFallback);
        }
    }

    Selection::NO_DATA
}
