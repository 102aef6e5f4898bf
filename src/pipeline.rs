//! Curation pipeline over a whole corpus
//!
//! Diseases are curated independently on a rayon pool. The outlier analysis
//! needs every per-disease estimate, so it runs only after the parallel pass
//! has fully joined.

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{info, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::algorithm::outlier::{ConsensusAnalyzer, OutlierReport};
use crate::algorithm::prevalence::curation::{DiseaseCuration, curate_disease};
use crate::algorithm::prevalence::statistics::{CurationStatistics, CurationTally};
use crate::config::CurationConfig;
use crate::models::corpus::Corpus;
use crate::models::profile::DiseasePrevalenceProfile;
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, log_stage_complete, log_stage_start,
};

/// Outcome of the per-disease pass
#[derive(Debug, Clone, PartialEq)]
pub struct CurationRun {
    /// Curated profiles in `orpha_code` order
    pub profiles: Vec<DiseasePrevalenceProfile>,
    /// Merged counts over all curated diseases
    pub tally: CurationTally,
    /// Whether the pass stopped before curating every disease
    pub cancelled: bool,
}

/// Outcome of a full pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Curated profiles with outlier flags, in `orpha_code` order
    pub profiles: Vec<DiseasePrevalenceProfile>,
    /// Merged counts over all curated diseases
    pub tally: CurationTally,
    /// Outlier report, absent when the run was cancelled
    pub report: Option<OutlierReport>,
    /// Whether the run stopped early
    pub cancelled: bool,
}

impl PipelineOutput {
    /// Human-readable summary of the run
    #[must_use]
    pub fn summary(&self) -> String {
        CurationStatistics::generate_summary(&self.tally, self.report.as_ref())
    }
}

/// Run `op` on a pool with `threads` workers, falling back to the global pool
fn run_in_pool<T: Send>(threads: usize, op: impl FnOnce() -> T + Send) -> T {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(op),
        Err(e) => {
            warn!("Could not build a {threads}-thread pool ({e}), using the global pool");
            op()
        }
    }
}

/// Curate every disease in the corpus
#[must_use]
pub fn curate_corpus(corpus: &Corpus, config: &CurationConfig) -> CurationRun {
    curate_corpus_with_cancel(corpus, config, &AtomicBool::new(false))
}

/// Curate every disease, checking `cancel` between diseases.
///
/// Diseases not started when the flag is raised are left out entirely.
#[must_use]
pub fn curate_corpus_with_cancel(
    corpus: &Corpus,
    config: &CurationConfig,
    cancel: &AtomicBool,
) -> CurationRun {
    let start = Instant::now();
    log_stage_start("Curating diseases", corpus.len());

    let entries: Vec<_> = corpus.iter().collect();
    let progress = if config.show_progress {
        create_main_progress_bar(entries.len() as u64, Some("Curating diseases"))
    } else {
        ProgressBar::hidden()
    };

    let outcomes: Vec<Option<DiseaseCuration>> =
        run_in_pool(config.effective_worker_threads(), || {
            entries
                .par_iter()
                .progress_with(progress.clone())
                .map(|(orpha_code, entry)| {
                    if cancel.load(Ordering::Relaxed) {
                        return None;
                    }
                    Some(curate_disease(
                        orpha_code,
                        &entry.disease_name,
                        &entry.records,
                        &config.selection,
                    ))
                })
                .collect()
        });
    finish_progress_bar(&progress, Some("Curation complete"));

    let mut profiles = Vec::with_capacity(outcomes.len());
    let mut tally = CurationTally::default();
    let mut cancelled = false;
    for outcome in outcomes {
        match outcome {
            Some(curation) => {
                tally.merge(curation.tally);
                profiles.push(curation.profile);
            }
            None => cancelled = true,
        }
    }

    if cancelled {
        warn!(
            "Curation cancelled after {} of {} diseases",
            profiles.len(),
            corpus.len()
        );
    }
    log_stage_complete("Curating diseases", profiles.len(), Some(start.elapsed()));

    CurationRun {
        profiles,
        tally,
        cancelled,
    }
}

/// Run the outlier analysis and copy each disease's flags onto its profile
pub fn apply_outlier_analysis(
    profiles: &mut [DiseasePrevalenceProfile],
    config: &CurationConfig,
) -> OutlierReport {
    let start = Instant::now();
    log_stage_start("Outlier analysis", profiles.len());

    let report = ConsensusAnalyzer::from_config(&config.outliers).analyze(profiles);
    for profile in profiles.iter_mut() {
        profile.outlier_flags = report.flags_for(&profile.orpha_code);
    }

    log_stage_complete("Outlier analysis", report.entries.len(), Some(start.elapsed()));
    report
}

/// Curate the corpus, then analyse outliers over the complete result
#[must_use]
pub fn run_pipeline(corpus: &Corpus, config: &CurationConfig) -> PipelineOutput {
    run_pipeline_with_cancel(corpus, config, &AtomicBool::new(false))
}

/// As [`run_pipeline`], stopping between diseases when `cancel` is raised.
///
/// A cancelled run has no outlier report: the analysis needs every disease.
#[must_use]
pub fn run_pipeline_with_cancel(
    corpus: &Corpus,
    config: &CurationConfig,
    cancel: &AtomicBool,
) -> PipelineOutput {
    let CurationRun {
        mut profiles,
        tally,
        cancelled,
    } = curate_corpus_with_cancel(corpus, config, cancel);

    let report = if cancelled {
        warn!("Skipping outlier analysis for a cancelled run");
        None
    } else {
        Some(apply_outlier_analysis(&mut profiles, config))
    };

    info!(
        "Pipeline finished: {} profiles, {} flagged",
        profiles.len(),
        profiles.iter().filter(|p| !p.outlier_flags.is_empty()).count()
    );

    PipelineOutput {
        profiles,
        tally,
        report,
        cancelled,
    }
}
