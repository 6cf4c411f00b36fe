//! Historical analog matches.

use chrono::{DateTime, Utc};

use crate::{QualityTier, Usable};

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PatternDiagnostics {
    pub raw_cosine: Option<f64>,
    pub penalty: Option<f64>,
    /// Indicators present in both the current state and the episode.
    pub overlap: Vec<String>,
    pub missing_indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PatternMatch {
    pub episode_id: String,
    pub label: String,
    pub period: Option<String>,
    /// Clamped to `[0, 100]`.
    pub similarity_pct: f64,
    pub confidence_tier: QualityTier,
    pub summary: Option<String>,
    pub diagnostics: PatternDiagnostics,
}

/// Matches sorted by descending similarity, ties by label.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PatternSet {
    pub matches: Vec<PatternMatch>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl PatternSet {
    pub fn top(&self) -> Option<&PatternMatch> {
        self.matches.first()
    }
}

impl Usable for PatternSet {
    fn record_count(&self) -> usize {
        self.matches.len()
    }
}
