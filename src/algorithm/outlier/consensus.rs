//! Consensus across outlier strategies
//!
//! Runs every configured strategy over the corpus of per-disease values and
//! counts, per disease, how many strategies flagged it. The result is a
//! separate report keyed by `orpha_code`; profiles are only read.

use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::algorithm::outlier::domain::{DomainObservation, DomainRule, DomainRuleDetector};
use crate::algorithm::outlier::iqr::IqrDetector;
use crate::algorithm::outlier::percentile::PercentileDetector;
use crate::algorithm::outlier::stats::{self, QuartileMethod};
use crate::algorithm::outlier::zscore::{LogZScoreDetector, ModifiedZScoreDetector, ZScoreDetector};
use crate::algorithm::outlier::{Bounds, OutlierDetector};
use crate::algorithm::prevalence::standardize::per_million;
use crate::algorithm::prevalence::weighted_mean::is_eligible;
use crate::config::{OutlierConfig, OutlierValueSource};
use crate::models::profile::DiseasePrevalenceProfile;

/// How strongly the strategies agree on an outlier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusLevel {
    /// Flagged by a single strategy
    Low,
    /// Flagged by at least the medium threshold of strategies
    Medium,
    /// Flagged by at least the high threshold of strategies
    High,
}

impl fmt::Display for ConsensusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{label}")
    }
}

/// Outlier findings for one disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierEntry {
    /// Orphanet disease identifier
    pub orpha_code: String,
    /// Value that was analysed
    pub value: f64,
    /// Strategies that flagged the disease, in configuration order
    pub flags: Vec<String>,
    /// Bounds each flagging strategy applied
    pub bounds_used: BTreeMap<String, Bounds>,
    /// Distinct strategy families among the flags
    pub votes: usize,
    /// Domain rules violated
    pub domain_rules: Vec<DomainRule>,
    /// Whether the value is a processing artifact rather than a genuine outlier
    pub is_artifact: bool,
    /// Agreement level, from `votes`
    pub consensus: ConsensusLevel,
    /// Value capped at the configured percentile bounds, for review
    pub winsorized_value: f64,
}

impl OutlierEntry {
    /// Number of strategies that flagged the disease
    #[must_use]
    pub fn flag_count(&self) -> usize {
        self.flags.len()
    }
}

/// Corpus-level outcome of one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    /// Strategy name
    pub name: String,
    /// Bounds applied to the corpus
    pub bounds: Bounds,
    /// Number of diseases flagged
    pub outlier_count: usize,
}

/// Result of the corpus-wide outlier pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    /// Which per-disease value was analysed
    pub value_source: OutlierValueSource,
    /// Diseases with a value to analyse
    pub analyzed_diseases: usize,
    /// Diseases left out for lack of data
    pub excluded_diseases: usize,
    /// Per-strategy bounds and counts
    pub strategies: Vec<StrategySummary>,
    /// Findings for every flagged disease
    pub entries: BTreeMap<String, OutlierEntry>,
}

impl OutlierReport {
    /// Strategy names that flagged a disease (empty if none)
    #[must_use]
    pub fn flags_for(&self, orpha_code: &str) -> Vec<String> {
        self.entries
            .get(orpha_code)
            .map(|entry| entry.flags.clone())
            .unwrap_or_default()
    }

    /// Genuine outliers at the given consensus level
    #[must_use]
    pub fn at_level(&self, level: ConsensusLevel) -> Vec<&OutlierEntry> {
        self.entries
            .values()
            .filter(|entry| !entry.is_artifact && entry.consensus == level)
            .collect()
    }

    /// Entries whose value is a processing artifact
    #[must_use]
    pub fn artifacts(&self) -> Vec<&OutlierEntry> {
        self.entries.values().filter(|entry| entry.is_artifact).collect()
    }
}

/// A disease prepared for analysis
#[derive(Debug, Clone)]
struct Candidate<'a> {
    orpha_code: &'a str,
    observation: DomainObservation,
}

/// Runs the configured strategies and aggregates their votes
pub struct ConsensusAnalyzer {
    detectors: Vec<Box<dyn OutlierDetector>>,
    domain: DomainRuleDetector,
    high_consensus: usize,
    medium_consensus: usize,
    value_source: OutlierValueSource,
    winsor_bounds: (f64, f64),
}

impl ConsensusAnalyzer {
    /// Build the strategy set described by the configuration
    #[must_use]
    pub fn from_config(config: &OutlierConfig) -> Self {
        let mut detectors: Vec<Box<dyn OutlierDetector>> = config
            .iqr_multipliers
            .iter()
            .map(|&m| {
                Box::new(IqrDetector::new(m).with_method(config.quartile_method))
                    as Box<dyn OutlierDetector>
            })
            .collect();
        detectors.push(Box::new(ZScoreDetector {
            threshold: config.zscore_threshold,
        }));
        detectors.push(Box::new(ModifiedZScoreDetector {
            threshold: config.modified_zscore_threshold,
        }));
        detectors.push(Box::new(LogZScoreDetector {
            threshold: config.log_zscore_threshold,
        }));
        detectors.push(Box::new(PercentileDetector {
            lower_pct: config.percentile_bounds.lower,
            upper_pct: config.percentile_bounds.upper,
            method: QuartileMethod::Linear,
        }));

        Self {
            detectors,
            domain: DomainRuleDetector::new(config.domain.clone()),
            high_consensus: config.high_consensus,
            medium_consensus: config.medium_consensus,
            value_source: config.value_source,
            winsor_bounds: (config.percentile_bounds.lower, config.percentile_bounds.upper),
        }
    }

    /// Names of all strategies, including the domain rules
    #[must_use]
    pub fn strategy_names(&self) -> Vec<String> {
        self.detectors
            .iter()
            .map(|d| d.name())
            .chain(std::iter::once(self.domain.name()))
            .collect()
    }

    fn level_for(&self, votes: usize) -> ConsensusLevel {
        if votes >= self.high_consensus {
            ConsensusLevel::High
        } else if votes >= self.medium_consensus {
            ConsensusLevel::Medium
        } else {
            ConsensusLevel::Low
        }
    }

    fn candidate<'a>(&self, profile: &'a DiseasePrevalenceProfile) -> Option<Candidate<'a>> {
        let (estimate, supporting) = match self.value_source {
            OutlierValueSource::MeanValue => {
                if !profile.has_mean_data() {
                    return None;
                }
                (
                    profile.mean_value_per_million,
                    profile.mean_calculation_metadata.valid_records_count,
                )
            }
            OutlierValueSource::SelectedClass => {
                if !profile.selected_class.is_finite() {
                    return None;
                }
                let supporting = profile.records.iter().filter(|r| r.has_finite_class()).count();
                (per_million(profile.selected_class), supporting)
            }
        };

        let max_reliability = profile
            .records
            .iter()
            .filter(|r| match self.value_source {
                OutlierValueSource::MeanValue => is_eligible(r),
                OutlierValueSource::SelectedClass => r.has_finite_class(),
            })
            .map(|r| r.reliability_score)
            .fold(0.0, f64::max);

        Some(Candidate {
            orpha_code: &profile.orpha_code,
            observation: DomainObservation {
                estimate,
                max_reliability,
                supporting_records: supporting,
            },
        })
    }

    /// Analyse the complete corpus of curated profiles
    #[must_use]
    pub fn analyze(&self, profiles: &[DiseasePrevalenceProfile]) -> OutlierReport {
        let candidates: Vec<Candidate<'_>> =
            profiles.iter().filter_map(|p| self.candidate(p)).collect();
        let values: Vec<f64> = candidates.iter().map(|c| c.observation.estimate).collect();
        info!(
            "Running {} outlier strategies over {} diseases",
            self.detectors.len() + 1,
            values.len()
        );

        let results: Vec<_> = self
            .detectors
            .par_iter()
            .map(|detector| (detector.name(), detector.family(), detector.detect(&values)))
            .collect();

        let mut flags: Vec<Vec<(String, Bounds)>> = vec![Vec::new(); candidates.len()];
        let mut families: Vec<Vec<String>> = vec![Vec::new(); candidates.len()];
        let mut strategies = Vec::with_capacity(results.len() + 1);
        for (name, family, result) in results {
            debug!(
                "{name}: bounds [{:.2}, {:.2}], {} outliers",
                result.lower_bound,
                result.upper_bound,
                result.outlier_indices.len()
            );
            for &index in &result.outlier_indices {
                flags[index].push((name.clone(), result.bounds()));
                families[index].push(family.clone());
            }
            strategies.push(StrategySummary {
                name,
                bounds: result.bounds(),
                outlier_count: result.outlier_indices.len(),
            });
        }

        let domain_name = self.domain.name();
        let domain_bounds = Bounds {
            lower: 0.0,
            upper: self.domain.config.eu_limit,
        };
        let violations: Vec<_> = candidates
            .iter()
            .map(|c| self.domain.evaluate(&c.observation))
            .collect();
        for (index, rules) in violations.iter().enumerate() {
            if !rules.is_empty() {
                flags[index].push((domain_name.clone(), domain_bounds));
                families[index].push(self.domain.family());
            }
        }
        strategies.push(StrategySummary {
            name: domain_name,
            bounds: domain_bounds,
            outlier_count: violations.iter().filter(|v| !v.is_empty()).count(),
        });

        let winsorized = stats::winsorize(&values, self.winsor_bounds.0, self.winsor_bounds.1);

        let entries: BTreeMap<String, OutlierEntry> = candidates
            .iter()
            .enumerate()
            .filter(|(index, _)| !flags[*index].is_empty())
            .map(|(index, candidate)| {
                let strategy_flags = &flags[index];
                let rules = &violations[index];
                let votes = families[index].iter().unique().count();
                let entry = OutlierEntry {
                    orpha_code: candidate.orpha_code.to_string(),
                    value: candidate.observation.estimate,
                    flags: strategy_flags.iter().map(|(name, _)| name.clone()).collect(),
                    bounds_used: strategy_flags.iter().cloned().collect(),
                    votes,
                    domain_rules: rules.iter().copied().collect(),
                    is_artifact: rules.contains(&DomainRule::ArtificialCeiling),
                    consensus: self.level_for(votes),
                    winsorized_value: winsorized[index],
                };
                (entry.orpha_code.clone(), entry)
            })
            .collect();

        let level_counts = entries.values().map(|e| e.consensus).counts();
        info!(
            "Outlier consensus: {} high, {} medium, {} low",
            level_counts.get(&ConsensusLevel::High).unwrap_or(&0),
            level_counts.get(&ConsensusLevel::Medium).unwrap_or(&0),
            level_counts.get(&ConsensusLevel::Low).unwrap_or(&0)
        );

        OutlierReport {
            value_source: self.value_source,
            analyzed_diseases: candidates.len(),
            excluded_diseases: profiles.len() - candidates.len(),
            strategies,
            entries,
        }
    }
}

impl Default for ConsensusAnalyzer {
    fn default() -> Self {
        Self::from_config(&OutlierConfig::default())
    }
}
