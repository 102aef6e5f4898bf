//! Reliability-weighted mean prevalence per disease
//!
//! Complements the categorical selection with a continuous estimate:
//! `Σ(estimate·score) / Σ(score)` over the eligible records, rounded to two
//! decimals.

use crate::models::profile::{CalculationMethod, MeanCalculationMetadata};
use crate::models::record::{PrevalenceRecord, PrevalenceType};

/// Decimal places kept in the mean
const MEAN_PRECISION: i32 = 2;

/// Continuous estimate for one disease
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedMean {
    /// Mean cases per million (0.0 when nothing is eligible)
    pub mean_value_per_million: f64,
    /// How the mean was obtained
    pub metadata: MeanCalculationMetadata,
}

/// Whether a record contributes to the weighted mean.
///
/// Case/family counts are qualitative, and records without a finite class or a
/// positive estimate carry no number.
#[must_use]
pub fn is_eligible(record: &PrevalenceRecord) -> bool {
    record.prevalence_type != PrevalenceType::CasesFamilies
        && record.has_finite_class()
        && record.per_million_estimate.is_some_and(|e| e > 0.0)
}

fn round_to_precision(value: f64) -> f64 {
    let factor = 10f64.powi(MEAN_PRECISION);
    (value * factor).round() / factor
}

/// Compute the weighted mean over a disease's annotated records
#[must_use]
pub fn weighted_mean(records: &[PrevalenceRecord]) -> WeightedMean {
    let mut pairs: Vec<(f64, f64)> = records
        .iter()
        .filter(|r| is_eligible(r))
        .filter_map(|r| r.per_million_estimate.map(|e| (e, r.reliability_score)))
        .collect();

    if pairs.is_empty() {
        return WeightedMean {
            mean_value_per_million: 0.0,
            metadata: MeanCalculationMetadata::no_valid_data(records.len()),
        };
    }

    // Fixed summation order keeps the floating-point result independent of input order
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let weight_sum: f64 = pairs.iter().map(|(_, w)| w).sum();
    let (mean, calculation_method) = if weight_sum > 0.0 {
        let weighted: f64 = pairs.iter().map(|(e, w)| e * w).sum();
        (weighted / weight_sum, CalculationMethod::ReliabilityWeightedMean)
    } else {
        let total: f64 = pairs.iter().map(|(e, _)| e).sum();
        (total / pairs.len() as f64, CalculationMethod::SimpleMeanFallback)
    };

    WeightedMean {
        mean_value_per_million: round_to_precision(mean),
        metadata: MeanCalculationMetadata {
            valid_records_count: pairs.len(),
            total_records_count: records.len(),
            calculation_method,
            weight_sum,
        },
    }
}
