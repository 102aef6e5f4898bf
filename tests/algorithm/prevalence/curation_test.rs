//! Tests for per-disease curation: scoring, selection and the weighted mean

use itertools::Itertools;
use prevalence_curator::algorithm::prevalence::{
    curate_disease, curate_records, is_eligible, reliability_score, select_prevalence_class,
    weighted_mean,
};
use prevalence_curator::models::{
    CalculationMethod, PrevalenceClass, PrevalenceRecord, PrevalenceType, Qualification,
    SelectionTier, ValidationStatus,
};
use prevalence_curator::SelectionConfig;

use crate::utils::raw_record;

const TYPES: [PrevalenceType; 6] = [
    PrevalenceType::PointPrevalence,
    PrevalenceType::BirthPrevalence,
    PrevalenceType::AnnualIncidence,
    PrevalenceType::CasesFamilies,
    PrevalenceType::LifetimePrevalence,
    PrevalenceType::Unknown,
];

fn scored(
    prevalence_type: PrevalenceType,
    class: PrevalenceClass,
    score: f64,
    area: &str,
) -> PrevalenceRecord {
    let mut record = PrevalenceRecord::new(
        "source",
        prevalence_type,
        Some(class),
        Qualification::ClassOnly,
        area,
        ValidationStatus::Validated,
    )
    .annotate();
    record.reliability_score = score;
    record
}

#[test]
fn test_single_worldwide_point_record_selects_its_class() {
    let records = [scored(
        PrevalenceType::PointPrevalence,
        PrevalenceClass::OneToNinePer100k,
        9.5,
        "Worldwide",
    )];
    let selection = select_prevalence_class(&records, &SelectionConfig::default());
    assert_eq!(selection.class, PrevalenceClass::OneToNinePer100k);
    assert_eq!(selection.tier, SelectionTier::PointPrevalence);
}

#[test]
fn test_single_birth_record_uses_birth_fallback() {
    let records = [scored(
        PrevalenceType::BirthPrevalence,
        PrevalenceClass::Above1In1000,
        8.0,
        "Spain",
    )];
    let selection = select_prevalence_class(&records, &SelectionConfig::default());
    assert_eq!(selection.tier, SelectionTier::BirthPrevalenceFallback);
    assert_eq!(selection.class, PrevalenceClass::SixToNinePer10k);
}

#[test]
fn test_disease_without_records_is_unknown() {
    let curation = curate_disease("404", "No data", &[], &SelectionConfig::default());
    let profile = curation.profile;
    assert_eq!(profile.selected_class, PrevalenceClass::Unknown);
    assert_eq!(profile.selection_tier, SelectionTier::NoData);
    assert_eq!(profile.mean_value_per_million, 0.0);
    assert_eq!(profile.mean_calculation_metadata.valid_records_count, 0);
    assert!(profile.outlier_flags.is_empty());
}

#[test]
fn test_birth_to_point_descends_one_bucket_per_application() {
    assert_eq!(
        PrevalenceClass::Above1In1000.birth_to_point(),
        PrevalenceClass::SixToNinePer10k
    );
    assert_eq!(
        PrevalenceClass::Above1In1000.birth_to_point().birth_to_point(),
        PrevalenceClass::OneToFivePer10k
    );
    assert_eq!(PrevalenceClass::Unknown.birth_to_point(), PrevalenceClass::Unknown);

    for class in PrevalenceClass::ALL {
        let converted = class.birth_to_point();
        match (class.rarity_rank(), converted.rarity_rank()) {
            (Some(before), Some(after)) => assert_eq!(after, (before + 1).min(5), "{class}"),
            (None, None) => assert_eq!(converted, PrevalenceClass::Unknown),
            _ => panic!("{class} changed finiteness"),
        }
    }
}

#[test]
fn test_reliability_score_is_bounded_for_every_combination() {
    let qualifications = [
        Qualification::ValueAndClass,
        Qualification::ClassOnly,
        Qualification::CaseReport,
        Qualification::Unknown,
    ];
    let statuses = [
        ValidationStatus::Validated,
        ValidationStatus::NotYetValidated,
        ValidationStatus::Unknown,
    ];
    let sources = ["123[PMID]", "[EXPERT] opinion", "PMID:1 and EXPERT OPINION", ""];
    let areas = ["Worldwide", "Denmark", ""];

    for ((((kind, qualification), status), source), area) in TYPES
        .into_iter()
        .cartesian_product(qualifications)
        .cartesian_product(statuses)
        .cartesian_product(sources)
        .cartesian_product(areas)
    {
        let record = PrevalenceRecord::new(
            source,
            kind,
            Some(PrevalenceClass::OneToNinePer100k),
            qualification,
            area,
            status,
        );
        let score = reliability_score(&record);
        assert!((0.0..=10.0).contains(&score), "{score} for {record:?}");
    }
}

#[test]
fn test_cases_families_never_eligible_for_mean() {
    for class in PrevalenceClass::ALL {
        let record = scored(PrevalenceType::CasesFamilies, class, 10.0, "Worldwide");
        assert!(!is_eligible(&record), "{class}");
    }

    let records = [
        scored(PrevalenceType::CasesFamilies, PrevalenceClass::Above1In1000, 10.0, "Worldwide"),
        scored(PrevalenceType::PointPrevalence, PrevalenceClass::OneToNinePer100k, 5.0, "Worldwide"),
    ];
    let mean = weighted_mean(&records);
    assert_eq!(mean.mean_value_per_million, 50.0);
    assert_eq!(mean.metadata.valid_records_count, 1);
}

#[test]
fn test_most_reliable_point_record_always_wins_tier_one() {
    let others: Vec<PrevalenceRecord> = TYPES
        .into_iter()
        .filter(|t| *t != PrevalenceType::PointPrevalence)
        .flat_map(|kind| {
            PrevalenceClass::ALL
                .into_iter()
                .map(move |class| scored(kind, class, 8.5, "Worldwide"))
        })
        .collect();

    for class in PrevalenceClass::ALL {
        let mut records = others.clone();
        records.push(scored(PrevalenceType::PointPrevalence, class, 9.0, "Norway"));
        let selection = select_prevalence_class(&records, &SelectionConfig::default());
        assert_eq!(selection.tier, SelectionTier::PointPrevalence);
        assert_eq!(selection.class, class);
    }
}

#[test]
fn test_weighted_mean_is_order_invariant() {
    let records = vec![
        scored(PrevalenceType::PointPrevalence, PrevalenceClass::OneToFivePer10k, 7.3, "Worldwide"),
        scored(PrevalenceType::BirthPrevalence, PrevalenceClass::OneToNinePer100k, 4.1, "Italy"),
        scored(PrevalenceType::AnnualIncidence, PrevalenceClass::BelowOnePerMillion, 2.7, "Japan"),
        scored(PrevalenceType::LifetimePrevalence, PrevalenceClass::OneToNinePerMillion, 9.9, "Chile"),
        scored(PrevalenceType::PointPrevalence, PrevalenceClass::Unknown, 6.0, "Worldwide"),
    ];
    let expected = weighted_mean(&records);
    assert_eq!(
        expected.metadata.calculation_method,
        CalculationMethod::ReliabilityWeightedMean
    );

    for permutation in records.iter().cloned().permutations(records.len()) {
        assert_eq!(weighted_mean(&permutation), expected);
        assert_eq!(
            select_prevalence_class(&permutation, &SelectionConfig::default()),
            select_prevalence_class(&records, &SelectionConfig::default())
        );
    }
}

#[test]
fn test_curate_disease_from_raw_records() {
    let raw = [
        raw_record("Point prevalence", "1-5 / 10 000", "Worldwide", "11[PMID]", false),
        raw_record("Point prevalence", "1-9 / 100 000", "France", "22[PMID]", true),
        raw_record("Birth prevalence", ">1/1000", "Worldwide", "[EXPERT]", true),
        serde_json::json!({ "source": ["not", "a", "string"] }),
    ];
    let curation = curate_disease("166024", "Example", &raw, &SelectionConfig::default());
    let profile = &curation.profile;

    // France record: validated 3 + pmid 2 + value and class 2 + point 2 + regional 1
    assert_eq!(profile.records[1].reliability_score, 10.0);
    assert_eq!(profile.selection_tier, SelectionTier::PointPrevalence);
    assert_eq!(profile.selected_class, PrevalenceClass::OneToNinePer100k);
    assert_eq!(curation.tally.skipped_records, 1);
    assert_eq!(profile.mean_calculation_metadata.total_records_count, 3);
    assert_eq!(profile.mean_calculation_metadata.valid_records_count, 3);
    // (300·6 + 50·10 + 5000·7.8) / 23.8
    assert_eq!(profile.mean_value_per_million, 1735.29);
}

#[test]
fn test_curate_records_reannotates_input() {
    let record = PrevalenceRecord::new(
        "PMID: 998",
        PrevalenceType::AnnualIncidence,
        Some(PrevalenceClass::OneToNinePerMillion),
        Qualification::ValueAndClass,
        "Worldwide",
        ValidationStatus::NotYetValidated,
    );
    let profile = curate_records("5", "Incidence only", vec![record], &SelectionConfig::default());
    assert_eq!(profile.records[0].reliability_score, 5.5);
    assert_eq!(profile.records[0].per_million_estimate, Some(5.0));
    assert_eq!(profile.selection_tier, SelectionTier::WorldwideFallback);
    assert_eq!(profile.selected_class, PrevalenceClass::OneToNinePerMillion);
    assert_eq!(profile.mean_value_per_million, 5.0);
}

#[test]
fn test_strong_incidence_record_selects_worldwide_fallback() {
    let records = vec![
        scored(PrevalenceType::AnnualIncidence, PrevalenceClass::OneToNinePer100k, 8.5, "Worldwide"),
        scored(PrevalenceType::CasesFamilies, PrevalenceClass::Above1In1000, 9.0, "Worldwide"),
    ];
    let selection = select_prevalence_class(&records, &SelectionConfig::default());
    assert_eq!(selection.tier, SelectionTier::WorldwideFallback);
    assert_eq!(selection.class, PrevalenceClass::OneToNinePer100k);
}
