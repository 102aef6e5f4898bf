//! End-to-end tests for the curation pipeline

use prevalence_curator::algorithm::outlier::ConsensusLevel;
use prevalence_curator::models::{Corpus, DiseaseEntry, PrevalenceClass, SelectionTier};
use prevalence_curator::{curate_corpus, run_pipeline};

use crate::utils::{quiet_config, raw_record, sample_corpus};

#[test]
fn test_pipeline_scenarios() {
    let output = run_pipeline(&sample_corpus(30), &quiet_config());
    assert!(!output.cancelled);
    assert_eq!(output.profiles.len(), 33);

    let by_code = |code: &str| {
        output
            .profiles
            .iter()
            .find(|p| p.orpha_code == code)
            .unwrap()
    };

    let empty = by_code("1000");
    assert_eq!(empty.selected_class, PrevalenceClass::Unknown);
    assert_eq!(empty.selection_tier, SelectionTier::NoData);
    assert_eq!(empty.mean_value_per_million, 0.0);
    assert_eq!(empty.mean_calculation_metadata.valid_records_count, 0);

    let birth = by_code("2000");
    assert_eq!(birth.selection_tier, SelectionTier::BirthPrevalenceFallback);
    assert_eq!(birth.selected_class, PrevalenceClass::SixToNinePer10k);
    assert_eq!(birth.mean_value_per_million, 5000.0);

    let regular = by_code("10001");
    assert_eq!(regular.selection_tier, SelectionTier::PointPrevalence);
    assert_eq!(regular.selected_class, PrevalenceClass::OneToNinePerMillion);
    assert_eq!(regular.mean_value_per_million, 5.0);
    assert_eq!(regular.mean_calculation_metadata.valid_records_count, 2);
    assert_eq!(regular.mean_calculation_metadata.total_records_count, 3);
}

#[test]
fn test_outlier_flags_are_copied_onto_profiles() {
    let output = run_pipeline(&sample_corpus(30), &quiet_config());
    let report = output.report.as_ref().unwrap();

    for profile in &output.profiles {
        assert_eq!(profile.outlier_flags, report.flags_for(&profile.orpha_code));
    }

    let high: Vec<&str> = report
        .at_level(ConsensusLevel::High)
        .iter()
        .map(|e| e.orpha_code.as_str())
        .collect();
    assert_eq!(high, vec!["2000", "3000"]);

    let weak = &report.entries["3000"];
    assert!(weak.flags.iter().any(|f| f == "domain_rules"));
    assert_eq!(weak.value, 750.0);
    assert!(!report.entries.contains_key("1000"));
}

#[test]
fn test_repeated_runs_are_identical() {
    let corpus = sample_corpus(60);
    let mut config = quiet_config();
    let first = run_pipeline(&corpus, &config);
    config.worker_threads = Some(7);
    let second = run_pipeline(&corpus, &config);

    assert_eq!(first.profiles, second.profiles);
    assert_eq!(first.report, second.report);
    assert_eq!(first.tally, second.tally);
}

#[test]
fn test_record_order_does_not_change_profiles() {
    let records = vec![
        raw_record("Point prevalence", "1-5 / 10 000", "Worldwide", "1[PMID]", false),
        raw_record("Birth prevalence", "1-9 / 100 000", "Brazil", "[EXPERT]", true),
        raw_record("Annual incidence", "<1 / 1 000 000", "Worldwide", "", true),
        raw_record("Point prevalence", "1-9 / 1 000 000", "Korea", "2[PMID]", false),
    ];
    let mut reversed = records.clone();
    reversed.reverse();

    let mut forward = Corpus::new();
    forward.insert("1", DiseaseEntry::new("Forward", records));
    let mut backward = Corpus::new();
    backward.insert("1", DiseaseEntry::new("Forward", reversed));

    let a = &curate_corpus(&forward, &quiet_config()).profiles[0];
    let b = &curate_corpus(&backward, &quiet_config()).profiles[0];
    assert_eq!(a.selected_class, b.selected_class);
    assert_eq!(a.selection_tier, b.selection_tier);
    assert_eq!(a.mean_value_per_million, b.mean_value_per_million);
    assert_eq!(a.mean_calculation_metadata, b.mean_calculation_metadata);
}

#[test]
fn test_summary_reports_tiers_and_outliers() {
    let output = run_pipeline(&sample_corpus(9), &quiet_config());
    let summary = output.summary();
    assert!(summary.contains("Diseases Curated: 12"));
    assert!(summary.contains("birth_prevalence_fallback: 1"));
    assert!(summary.contains("no_data: 1"));
    assert!(summary.contains("worldwide_fallback: 1"));
    assert!(summary.contains("Outlier Analysis:"));
    assert_eq!(output.tally.tier_count(SelectionTier::PointPrevalence), 9);
}
