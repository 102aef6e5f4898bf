//! Tests for corpus loading and result persistence

use prevalence_curator::loader::{
    OutlierReportDocument, ResultView, ResultsDocument, load_corpus, load_corpus_async,
    write_outlier_report, write_results,
};
use prevalence_curator::models::PrevalenceClass;
use prevalence_curator::{CurationConfig, CurationError, run_pipeline};

use crate::utils::{ScratchDir, quiet_config, sample_corpus};

#[test]
fn test_missing_corpus_is_fatal() {
    let scratch = ScratchDir::new("missing");
    let err = load_corpus(&scratch.path.join("absent.json")).unwrap_err();
    assert!(matches!(err, CurationError::Io { .. }));
}

#[test]
fn test_corrupt_corpus_is_fatal() {
    let scratch = ScratchDir::new("corrupt");
    let path = scratch.path.join("corpus.json");
    std::fs::write(&path, r#"{ "58": { "records": [ "#).unwrap();
    let err = load_corpus(&path).unwrap_err();
    assert!(matches!(err, CurationError::Parse { .. }));
}

#[tokio::test]
async fn test_async_and_sync_loading_agree() {
    let scratch = ScratchDir::new("load");
    let path = scratch.path.join("corpus.json");
    let corpus = sample_corpus(5);
    std::fs::write(&path, serde_json::to_string_pretty(&corpus).unwrap()).unwrap();

    let sync_loaded = load_corpus(&path).unwrap();
    let async_loaded = load_corpus_async(&path).await.unwrap();
    assert_eq!(sync_loaded, corpus);
    assert_eq!(async_loaded, corpus);
}

#[test]
fn test_write_results_in_both_views() {
    let scratch = ScratchDir::new("results");
    let output = run_pipeline(&sample_corpus(6), &quiet_config());

    let class_path = scratch.path.join("nested/class.json");
    write_results(&class_path, &output, ResultView::SelectedClass).unwrap();
    let class_doc: ResultsDocument =
        serde_json::from_str(&std::fs::read_to_string(&class_path).unwrap()).unwrap();
    assert_eq!(class_doc.view, ResultView::SelectedClass);
    assert_eq!(class_doc.diseases.len(), 9);
    let birth = &class_doc.diseases["2000"];
    assert_eq!(birth.selected_class, Some(PrevalenceClass::SixToNinePer10k));
    assert_eq!(birth.mean_value_per_million, None);

    let mean_path = scratch.path.join("mean.json");
    write_results(&mean_path, &output, ResultView::MeanValue).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&mean_path).unwrap()).unwrap();
    let empty = &raw["diseases"]["1000"];
    assert_eq!(empty["mean_value_per_million"], 0.0);
    assert_eq!(empty["selection_tier"], "no_data");
    assert_eq!(empty["mean_calculation_metadata"]["calculation_method"], "no_valid_data");
    assert!(empty.get("selected_class").is_none());

    let leftovers: Vec<_> = std::fs::read_dir(&scratch.path)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_write_outlier_report() {
    let scratch = ScratchDir::new("report");
    let output = run_pipeline(&sample_corpus(6), &quiet_config());
    let report = output.report.as_ref().unwrap();

    let path = scratch.path.join("outlier_report.json");
    write_outlier_report(&path, report).unwrap();
    let document: OutlierReportDocument =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document.report.analyzed_diseases, report.analyzed_diseases);
    assert_eq!(document.report.strategies.len(), report.strategies.len());
    assert!(document.report.entries.keys().eq(report.entries.keys()));
    assert_eq!(document.report.entries["2000"].flags, report.entries["2000"].flags);
}

#[test]
fn test_config_file_keeps_defaults() {
    let scratch = ScratchDir::new("config");
    let path = scratch.path.join("config.json");
    std::fs::write(
        &path,
        r#"{ "selection": { "reliability_threshold": 7.0 }, "show_progress": false }"#,
    )
    .unwrap();

    let config = CurationConfig::from_json_file(&path).unwrap();
    assert_eq!(config.selection.reliability_threshold, 7.0);
    assert!(!config.show_progress);
    assert_eq!(config.outliers.high_consensus, 4);

    std::fs::write(&path, r#"{ "outliers": { "medium_consensus": 9 } }"#).unwrap();
    let err = CurationConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, CurationError::Config(_)));
}
