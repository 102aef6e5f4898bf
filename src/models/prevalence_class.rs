//! Prevalence class model
//!
//! Orphanet reports prevalence as one of a small number of ordered buckets.
//! This module holds the canonical bucket enum, lenient label parsing and the
//! birth-to-point prevalence conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight canonical prevalence buckets
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PrevalenceClass {
    /// More than 1 in 1,000
    #[serde(rename = ">1/1000")]
    Above1In1000,
    /// 6 to 9 in 10,000
    #[serde(rename = "6-9/10000")]
    SixToNinePer10k,
    /// 1 to 5 in 10,000
    #[serde(rename = "1-5/10000")]
    OneToFivePer10k,
    /// 1 to 9 in 100,000
    #[serde(rename = "1-9/100000")]
    OneToNinePer100k,
    /// 1 to 9 in 1,000,000
    #[serde(rename = "1-9/1000000")]
    OneToNinePerMillion,
    /// Less than 1 in 1,000,000
    #[serde(rename = "<1/1000000")]
    BelowOnePerMillion,
    /// Prevalence is unknown
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
    /// No prevalence has been documented yet
    #[serde(rename = "Not yet documented")]
    NotYetDocumented,
}

impl PrevalenceClass {
    /// All buckets, most common first
    pub const ALL: [Self; 8] = [
        Self::Above1In1000,
        Self::SixToNinePer10k,
        Self::OneToFivePer10k,
        Self::OneToNinePer100k,
        Self::OneToNinePerMillion,
        Self::BelowOnePerMillion,
        Self::Unknown,
        Self::NotYetDocumented,
    ];

    /// Canonical label of the bucket
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Above1In1000 => ">1/1000",
            Self::SixToNinePer10k => "6-9/10000",
            Self::OneToFivePer10k => "1-5/10000",
            Self::OneToNinePer100k => "1-9/100000",
            Self::OneToNinePerMillion => "1-9/1000000",
            Self::BelowOnePerMillion => "<1/1000000",
            Self::Unknown => "Unknown",
            Self::NotYetDocumented => "Not yet documented",
        }
    }

    /// Parse a class label.
    ///
    /// Whitespace, case and en-dashes are ignored, so the Orphanet spelling
    /// `"1-9 / 100 000"` parses the same as `"1-9/100000"`. Returns `None`
    /// for labels that match no bucket.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == '\u{2013}' { '-' } else { c })
            .collect::<String>()
            .to_lowercase();

        Self::ALL.into_iter().find(|class| {
            let canonical: String = class
                .label()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            canonical == normalized
        })
    }

    /// Whether the bucket carries a usable numeric range
    #[must_use]
    pub const fn is_finite(self) -> bool {
        !matches!(self, Self::Unknown | Self::NotYetDocumented)
    }

    /// Position in the rarity order (0 = most common), `None` for non-finite buckets
    #[must_use]
    pub const fn rarity_rank(self) -> Option<u8> {
        match self {
            Self::Above1In1000 => Some(0),
            Self::SixToNinePer10k => Some(1),
            Self::OneToFivePer10k => Some(2),
            Self::OneToNinePer100k => Some(3),
            Self::OneToNinePerMillion => Some(4),
            Self::BelowOnePerMillion => Some(5),
            Self::Unknown | Self::NotYetDocumented => None,
        }
    }

    /// Convert a birth prevalence bucket to the point prevalence bucket one step rarer.
    ///
    /// Birth prevalence overstates living-population prevalence for conditions
    /// with reduced life expectancy, so each application descends one bucket.
    /// The rarest bucket is a fixed point; non-finite buckets become `Unknown`.
    #[must_use]
    pub const fn birth_to_point(self) -> Self {
        match self {
            Self::Above1In1000 => Self::SixToNinePer10k,
            Self::SixToNinePer10k => Self::OneToFivePer10k,
            Self::OneToFivePer10k => Self::OneToNinePer100k,
            Self::OneToNinePer100k => Self::OneToNinePerMillion,
            Self::OneToNinePerMillion | Self::BelowOnePerMillion => Self::BelowOnePerMillion,
            Self::Unknown | Self::NotYetDocumented => Self::Unknown,
        }
    }
}

impl fmt::Display for PrevalenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
