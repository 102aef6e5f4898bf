//! Tests for the corpus-wide outlier strategies and their consensus

use prevalence_curator::algorithm::outlier::{
    ConsensusAnalyzer, ConsensusLevel, DomainRule, DomainRuleDetector, IqrDetector,
    LogZScoreDetector, ModifiedZScoreDetector, OutlierDetector, PercentileDetector, QuartileMethod,
    ZScoreDetector,
};
use prevalence_curator::models::{
    CalculationMethod, DiseasePrevalenceProfile, MeanCalculationMetadata, PrevalenceClass,
    PrevalenceRecord, PrevalenceType, Qualification, SelectionTier, ValidationStatus,
};
use prevalence_curator::config::{DomainRuleConfig, PercentileBounds};
use prevalence_curator::{OutlierConfig, OutlierValueSource};

fn all_detectors() -> Vec<Box<dyn OutlierDetector>> {
    vec![
        Box::new(IqrDetector::new(1.5)),
        Box::new(IqrDetector::new(3.0).with_method(QuartileMethod::Midpoint)),
        Box::new(ZScoreDetector::default()),
        Box::new(ModifiedZScoreDetector::default()),
        Box::new(LogZScoreDetector::default()),
        Box::new(PercentileDetector::default()),
        Box::new(DomainRuleDetector::default()),
    ]
}

/// Validated worldwide point prevalence with a PubMed source (reliability 9)
fn solid_record(class: PrevalenceClass) -> PrevalenceRecord {
    PrevalenceRecord::new(
        "1[PMID]",
        PrevalenceType::PointPrevalence,
        Some(class),
        Qualification::ValueAndClass,
        "Worldwide",
        ValidationStatus::Validated,
    )
    .annotate()
}

fn profile(orpha_code: &str, mean: f64, class: PrevalenceClass) -> DiseasePrevalenceProfile {
    let records = vec![solid_record(class); 3];
    DiseasePrevalenceProfile {
        orpha_code: orpha_code.to_string(),
        disease_name: format!("Disease {orpha_code}"),
        selected_class: class,
        selection_tier: SelectionTier::PointPrevalence,
        mean_value_per_million: mean,
        mean_calculation_metadata: MeanCalculationMetadata {
            valid_records_count: records.len(),
            total_records_count: records.len(),
            calculation_method: CalculationMethod::ReliabilityWeightedMean,
            weight_sum: 27.0,
        },
        records,
        outlier_flags: Vec::new(),
    }
}

fn no_data_profile(orpha_code: &str) -> DiseasePrevalenceProfile {
    DiseasePrevalenceProfile {
        orpha_code: orpha_code.to_string(),
        disease_name: "No data".to_string(),
        records: Vec::new(),
        selected_class: PrevalenceClass::Unknown,
        selection_tier: SelectionTier::NoData,
        mean_value_per_million: 0.0,
        mean_calculation_metadata: MeanCalculationMetadata::no_valid_data(0),
        outlier_flags: Vec::new(),
    }
}

#[test]
fn test_iqr_smaller_multiplier_flags_superset() {
    let datasets: Vec<Vec<f64>> = vec![
        vec![0.5, 5.0, 5.0, 50.0, 50.0, 50.0, 300.0, 750.0, 5000.0],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0, -100.0],
        (1..=50).map(|i| f64::from(i * i)).collect(),
        vec![0.5; 10],
    ];
    let methods = [
        QuartileMethod::Linear,
        QuartileMethod::Lower,
        QuartileMethod::Higher,
        QuartileMethod::Nearest,
        QuartileMethod::Midpoint,
    ];

    for values in &datasets {
        for method in methods {
            let loose = IqrDetector::new(1.5).with_method(method).detect(values);
            let strict = IqrDetector::new(3.0).with_method(method).detect(values);
            for index in &strict.outlier_indices {
                assert!(
                    loose.outlier_indices.contains(index),
                    "{method:?}: index {index} flagged at 3.0 but not 1.5"
                );
            }
        }
    }
}

#[test]
fn test_degenerate_inputs_never_flag() {
    let inputs: [&[f64]; 4] = [&[], &[42.0], &[7.0; 30], &[f64::NAN, f64::INFINITY]];
    for detector in all_detectors() {
        for values in inputs {
            let result = detector.detect(values);
            assert!(result.is_empty(), "{} flagged {values:?}", detector.name());
        }
    }
}

#[test]
fn test_artifact_value_flagged_by_domain_rules_alone() {
    let mut profiles: Vec<DiseasePrevalenceProfile> = [600.0, 700.0, 800.0, 900.0, 1100.0, 1200.0, 1300.0, 1400.0]
        .into_iter()
        .enumerate()
        .map(|(i, mean)| profile(&format!("{}", 100 + i), mean, PrevalenceClass::SixToNinePer10k))
        .collect();
    profiles.push(profile("999", 1000.0, PrevalenceClass::Above1In1000));

    let report = ConsensusAnalyzer::from_config(&OutlierConfig::default()).analyze(&profiles);
    let entry = &report.entries["999"];

    assert_eq!(entry.flags, vec!["domain_rules".to_string()]);
    assert_eq!(entry.domain_rules, vec![DomainRule::ArtificialCeiling]);
    assert!(entry.is_artifact);
    assert_eq!(entry.consensus, ConsensusLevel::Low);
    assert!(report.artifacts().iter().any(|e| e.orpha_code == "999"));
    assert!(report.at_level(ConsensusLevel::Low).iter().all(|e| e.orpha_code != "999"));
}

#[test]
fn test_consensus_marks_extreme_high_estimate() {
    let mut profiles: Vec<DiseasePrevalenceProfile> = (0..30)
        .map(|i| {
            let (mean, class) = match i % 3 {
                0 => (0.5, PrevalenceClass::BelowOnePerMillion),
                1 => (5.0, PrevalenceClass::OneToNinePerMillion),
                _ => (50.0, PrevalenceClass::OneToNinePer100k),
            };
            profile(&format!("{}", 1000 + i), mean, class)
        })
        .collect();
    profiles.push(profile("5000", 5000.0, PrevalenceClass::Above1In1000));
    profiles.push(no_data_profile("7"));

    let before = profiles.clone();
    let report = ConsensusAnalyzer::default().analyze(&profiles);
    assert_eq!(profiles, before);

    assert_eq!(report.analyzed_diseases, 31);
    assert_eq!(report.excluded_diseases, 1);
    assert!(!report.entries.contains_key("7"));

    let entry = &report.entries["5000"];
    assert_eq!(entry.consensus, ConsensusLevel::High);
    assert!(entry.flag_count() >= 4);
    assert!(entry.votes >= 4);
    assert!(entry.votes < entry.flag_count());
    for name in ["iqr_1.5", "iqr_3", "domain_rules"] {
        assert!(entry.flags.iter().any(|f| f == name), "missing {name}");
        assert!(entry.bounds_used.contains_key(name));
    }
    assert_eq!(entry.domain_rules, vec![DomainRule::EuDefinitionBreach]);
    assert!(entry.winsorized_value < entry.value);
    assert_eq!(report.flags_for("5000"), entry.flags);
    assert!(report.flags_for("1000").is_empty());

    let summary = report.strategies.iter().find(|s| s.name == "iqr_1.5").unwrap();
    assert_eq!(summary.outlier_count, 1);
    assert_eq!(report.strategies.len(), 9);
}

#[test]
fn test_iqr_fences_count_as_one_vote() {
    let config = OutlierConfig {
        zscore_threshold: 1e9,
        modified_zscore_threshold: 1e9,
        log_zscore_threshold: 1e9,
        percentile_bounds: PercentileBounds {
            lower: 0.0,
            upper: 100.0,
        },
        domain: DomainRuleConfig {
            high_estimate: 1e9,
            eu_limit: 1e9,
            artifact_values: Vec::new(),
            ..DomainRuleConfig::default()
        },
        ..OutlierConfig::default()
    };

    let mut profiles: Vec<DiseasePrevalenceProfile> = (10..50)
        .map(|i| profile(&format!("{i}"), f64::from(i), PrevalenceClass::OneToNinePer100k))
        .collect();
    for code in ["900", "901", "902"] {
        profiles.push(profile(code, 120.0, PrevalenceClass::OneToNinePer100k));
    }

    let report = ConsensusAnalyzer::from_config(&config).analyze(&profiles);
    let entry = &report.entries["900"];
    assert_eq!(entry.flags, vec!["iqr_1.5", "iqr_2", "iqr_2.5", "iqr_3"]);
    assert_eq!(entry.bounds_used.len(), 4);
    assert_eq!(entry.votes, 1);
    assert_eq!(entry.consensus, ConsensusLevel::Low);
    assert!(report.at_level(ConsensusLevel::High).is_empty());
}

#[test]
fn test_selected_class_value_source() {
    let mut config = OutlierConfig::default();
    config.value_source = OutlierValueSource::SelectedClass;

    let mut profiles: Vec<DiseasePrevalenceProfile> = (0..12)
        .map(|i| profile(&format!("{i}"), 0.0, PrevalenceClass::OneToNinePer100k))
        .collect();
    profiles.push(profile("big", 0.0, PrevalenceClass::Above1In1000));
    profiles.push(no_data_profile("none"));

    let report = ConsensusAnalyzer::from_config(&config).analyze(&profiles);
    assert_eq!(report.value_source, OutlierValueSource::SelectedClass);
    assert_eq!(report.analyzed_diseases, 13);
    assert_eq!(report.entries["big"].value, 5000.0);
    assert!(report.entries["big"].flags.iter().any(|f| f == "domain_rules"));
}
