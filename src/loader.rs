//! Corpus loading and result persistence
//!
//! The corpus is read whole ("load once"), curated in memory, and results are
//! written once at the end. Writes go through a temporary sibling file that is
//! renamed into place, so an output file is either complete or absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use crate::algorithm::outlier::OutlierReport;
use crate::error::{CurationError, Result};
use crate::models::corpus::Corpus;
use crate::models::prevalence_class::PrevalenceClass;
use crate::models::profile::{DiseasePrevalenceProfile, MeanCalculationMetadata, SelectionTier};
use crate::pipeline::PipelineOutput;
use crate::utils::logging::{log_stage_complete, log_stage_start, log_warning};

/// Default file name for curated results
pub const RESULTS_FILE: &str = "curated_prevalence.json";

/// Default file name for the outlier report
pub const OUTLIER_REPORT_FILE: &str = "outlier_report.json";

fn parse_corpus(path: &Path, content: &str) -> Result<Corpus> {
    let corpus: Corpus = serde_json::from_str(content).map_err(|e| CurationError::parse(path, e))?;

    if let Some((code, _)) = corpus.iter().find(|(code, _)| code.trim().is_empty()) {
        return Err(CurationError::InvalidCorpus(format!(
            "empty orpha_code key {code:?} in {}",
            path.display()
        )));
    }
    if corpus.is_empty() {
        log_warning("Corpus contains no diseases", Some(path));
    }

    Ok(corpus)
}

/// Load a corpus file
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let start = Instant::now();
    log::info!("Loading corpus from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| CurationError::io(path, e))?;
    let corpus = parse_corpus(path, &content)?;
    log_stage_complete("Loading corpus", corpus.len(), Some(start.elapsed()));
    Ok(corpus)
}

/// Load a corpus file asynchronously
pub async fn load_corpus_async(path: &Path) -> Result<Corpus> {
    let start = Instant::now();
    log::info!("Loading corpus asynchronously from {}", path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CurationError::io(path, e))?;
    let corpus = parse_corpus(path, &content)?;
    log_stage_complete("Loading corpus", corpus.len(), Some(start.elapsed()));
    Ok(corpus)
}

/// Which per-disease value the results file carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultView {
    /// The categorical selected class
    #[default]
    SelectedClass,
    /// The continuous weighted mean per million
    MeanValue,
}

impl FromStr for ResultView {
    type Err = CurationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "class" | "selected_class" => Ok(Self::SelectedClass),
            "mean" | "mean_value" => Ok(Self::MeanValue),
            other => Err(CurationError::config(format!(
                "unknown result view '{other}', expected 'class' or 'mean'"
            ))),
        }
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectedClass => write!(f, "selected_class"),
            Self::MeanValue => write!(f, "mean_value"),
        }
    }
}

/// Persisted result for one disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedResult {
    /// Preferred disease name
    pub disease_name: String,
    /// Selected class, present in the class view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_class: Option<PrevalenceClass>,
    /// Weighted mean, present in the mean view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_value_per_million: Option<f64>,
    /// Tier that produced the selected class
    pub selection_tier: SelectionTier,
    /// How the weighted mean was computed
    pub mean_calculation_metadata: MeanCalculationMetadata,
    /// Outlier strategies that flagged the disease
    pub outlier_flags: Vec<String>,
}

impl CuratedResult {
    /// Project a profile onto the requested view
    #[must_use]
    pub fn from_profile(profile: &DiseasePrevalenceProfile, view: ResultView) -> Self {
        let (selected_class, mean_value_per_million) = match view {
            ResultView::SelectedClass => (Some(profile.selected_class), None),
            ResultView::MeanValue => (None, Some(profile.mean_value_per_million)),
        };
        Self {
            disease_name: profile.disease_name.clone(),
            selected_class,
            mean_value_per_million,
            selection_tier: profile.selection_tier,
            mean_calculation_metadata: profile.mean_calculation_metadata.clone(),
            outlier_flags: profile.outlier_flags.clone(),
        }
    }
}

/// Contents of the results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    /// When the file was written
    pub generated_at: DateTime<Utc>,
    /// View the results were written in
    pub view: ResultView,
    /// Whether the run stopped before curating every disease
    pub cancelled: bool,
    /// Results keyed by `orpha_code`
    pub diseases: BTreeMap<String, CuratedResult>,
}

/// Contents of the outlier report file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReportDocument {
    /// When the file was written
    pub generated_at: DateTime<Utc>,
    /// The report
    #[serde(flatten)]
    pub report: OutlierReport,
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_json_to(path: &Path, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).map_err(|e| CurationError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| CurationError::parse(path, e))?;
    writer.flush().map_err(|e| CurationError::io(path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| CurationError::io(path, e))
}

/// Write JSON to a temporary sibling, then rename it into place
pub fn write_json_atomic(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CurationError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_json_to(&tmp, value) {
        // Best effort: the original error is the one worth reporting
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| CurationError::io(path, e))
}

/// Write curated results in the requested view
pub fn write_results(path: &Path, output: &PipelineOutput, view: ResultView) -> Result<()> {
    let start = Instant::now();
    log_stage_start("Writing results", output.profiles.len());

    let document = ResultsDocument {
        generated_at: Utc::now(),
        view,
        cancelled: output.cancelled,
        diseases: output
            .profiles
            .iter()
            .map(|p| (p.orpha_code.clone(), CuratedResult::from_profile(p, view)))
            .collect(),
    };
    write_json_atomic(path, &document)?;

    log_stage_complete("Writing results", document.diseases.len(), Some(start.elapsed()));
    Ok(())
}

/// Write the outlier report
pub fn write_outlier_report(path: &Path, report: &OutlierReport) -> Result<()> {
    let document = OutlierReportDocument {
        generated_at: Utc::now(),
        report: report.clone(),
    };
    write_json_atomic(path, &document)?;
    log::info!(
        "Wrote outlier report for {} flagged diseases to {}",
        report.entries.len(),
        path.display()
    );
    Ok(())
}
