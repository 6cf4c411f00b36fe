//! Theme signals - the per-theme rows of the headline index.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::Usable;

/// Discretized stress severity derived from a theme's z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StressLevel {
    #[default]
    Unknown,
    Stable,
    Watch,
    Approaching,
    Critical,
}

impl StressLevel {
    /// Match an explicit upstream label.
    ///
    /// The canonical names are accepted as-is; `elevated` and `high` are
    /// legacy labels for `watch` and `approaching`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "stable" => Some(StressLevel::Stable),
            "watch" | "elevated" => Some(StressLevel::Watch),
            "approaching" | "high" => Some(StressLevel::Approaching),
            "critical" => Some(StressLevel::Critical),
            _ => None,
        }
    }

    /// Threshold `|z|` at 1, 2 and 3.
    pub fn from_z_score(z: f64) -> Self {
        if !z.is_finite() {
            return StressLevel::Unknown;
        }
        let z = z.abs();
        if z < 1.0 {
            StressLevel::Stable
        } else if z < 2.0 {
            StressLevel::Watch
        } else if z < 3.0 {
            StressLevel::Approaching
        } else {
            StressLevel::Critical
        }
    }

    /// An explicit label wins when recognized; otherwise the score decides.
    pub fn resolve(label: Option<&str>, z: Option<f64>) -> Self {
        label
            .and_then(Self::from_label)
            .or_else(|| z.map(Self::from_z_score))
            .unwrap_or(StressLevel::Unknown)
    }

    /// Ordinal for sorting, most severe highest.
    pub fn rank(&self) -> u8 {
        match self {
            StressLevel::Unknown => 0,
            StressLevel::Stable => 1,
            StressLevel::Watch => 2,
            StressLevel::Approaching => 3,
            StressLevel::Critical => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Unknown => "unknown",
            StressLevel::Stable => "stable",
            StressLevel::Watch => "watch",
            StressLevel::Approaching => "approaching",
            StressLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for StressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width of a stress bar relative to a full-scale `|z| = 3`.
pub fn bar_ratio(z: Option<f64>) -> f64 {
    match z {
        Some(z) if z.is_finite() => (z.abs() / 3.0).min(1.0),
        _ => 0.0,
    }
}

/// How recently a theme's underlying data was updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Freshness {
    Fresh,
    Recent,
    Warning,
    Stale,
    #[default]
    Unknown,
}

impl Freshness {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "fresh" | "current" | "live" => Some(Freshness::Fresh),
            "recent" => Some(Freshness::Recent),
            "warning" | "aging" | "delayed" => Some(Freshness::Warning),
            "stale" | "outdated" => Some(Freshness::Stale),
            _ => None,
        }
    }

    /// Bucket an age at 6, 24 and 72 hours.
    pub fn from_age_hours(hours: f64) -> Self {
        if hours.is_nan() {
            return Freshness::Unknown;
        }
        let hours = hours.max(0.0);
        if hours < 6.0 {
            Freshness::Fresh
        } else if hours < 24.0 {
            Freshness::Recent
        } else if hours < 72.0 {
            Freshness::Warning
        } else {
            Freshness::Stale
        }
    }

    pub fn resolve(label: Option<&str>, age_hours: Option<f64>) -> Self {
        label
            .and_then(Self::from_label)
            .or_else(|| age_hours.map(Self::from_age_hours))
            .unwrap_or(Freshness::Unknown)
    }

    /// Ordinal for sorting, freshest lowest.
    pub fn rank(&self) -> u8 {
        match self {
            Freshness::Fresh => 0,
            Freshness::Recent => 1,
            Freshness::Warning => 2,
            Freshness::Stale => 3,
            Freshness::Unknown => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::Fresh => "fresh",
            Freshness::Recent => "recent",
            Freshness::Warning => "warning",
            Freshness::Stale => "stale",
            Freshness::Unknown => "unknown",
        }
    }
}

/// Confidence in a derived figure (theme data quality, pattern analogs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum QualityTier {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl QualityTier {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => QualityTier::High,
            "medium" => QualityTier::Medium,
            "low" => QualityTier::Low,
            _ => QualityTier::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
            QualityTier::Unknown => "unknown",
        }
    }
}

/// Direction of a theme's recent movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Trend {
    Rising,
    Falling,
    Steady,
    #[default]
    Unknown,
}

impl Trend {
    /// Momentum inside this band counts as steady.
    pub const STEADY_BAND: f64 = 0.1;

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "rising" | "up" | "increasing" | "worsening" => Some(Trend::Rising),
            "falling" | "down" | "decreasing" | "improving" => Some(Trend::Falling),
            "stable" | "steady" | "flat" => Some(Trend::Steady),
            _ => None,
        }
    }

    pub fn from_momentum(momentum: f64) -> Self {
        if !momentum.is_finite() {
            Trend::Unknown
        } else if momentum > Self::STEADY_BAND {
            Trend::Rising
        } else if momentum < -Self::STEADY_BAND {
            Trend::Falling
        } else {
            Trend::Steady
        }
    }

    pub fn resolve(label: Option<&str>, momentum: Option<f64>) -> Self {
        label
            .and_then(Self::from_label)
            .or_else(|| momentum.map(Self::from_momentum))
            .unwrap_or(Trend::Unknown)
    }
}

/// One indicator feeding a theme.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct IndicatorDetail {
    pub indicator_id: String,
    pub indicator_name: String,
    pub source: Option<String>,
    pub raw_value: Option<f64>,
    pub normalized_z: Option<f64>,
    pub unit: Option<String>,
    pub date: Option<String>,
}

/// A normalized per-theme record.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ThemeSignal {
    pub theme_id: String,
    pub theme_name: String,
    pub category: String,
    /// Mean z-score across the theme's indicators.
    pub stress_score: Option<f64>,
    pub stress_level: StressLevel,
    /// `min(|z| / 3, 1)`, zero when the score is missing.
    pub bar_ratio: f64,
    pub trend: Trend,
    pub momentum_30d: Option<f64>,
    pub weight: Option<f64>,
    pub weighted_contribution: Option<f64>,
    pub quality: QualityTier,
    pub freshness: Freshness,
    pub age_hours: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub indicators: Vec<IndicatorDetail>,
}

/// The headline index with its theme breakdown.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WssiIndex {
    pub wssi_value: Option<f64>,
    pub wssi_score: Option<f64>,
    pub wssi_delta: Option<f64>,
    pub trend: Trend,
    pub stress_level: StressLevel,
    pub active_themes: Option<u32>,
    pub above_warning: Option<u32>,
    pub calculated_at: Option<DateTime<Utc>>,
    pub themes: Vec<ThemeSignal>,
}

impl WssiIndex {
    /// Themes ordered most stressed first, then freshest, then by name.
    pub fn themes_by_severity(&self) -> Vec<&ThemeSignal> {
        let mut themes: Vec<&ThemeSignal> = self.themes.iter().collect();
        themes.sort_by(|a, b| {
            b.stress_level
                .rank()
                .cmp(&a.stress_level.rank())
                .then_with(|| a.freshness.rank().cmp(&b.freshness.rank()))
                .then_with(|| a.theme_name.cmp(&b.theme_name))
        });
        themes
    }

    /// Build the id → name/category lookup for labelling other resources.
    pub fn catalog(&self) -> ThemeCatalog {
        let mut catalog = ThemeCatalog::default();
        for theme in &self.themes {
            catalog.insert(
                theme.theme_id.clone(),
                ThemeMeta {
                    name: theme.theme_name.clone(),
                    category: theme.category.clone(),
                },
            );
        }
        catalog
    }
}

impl Usable for WssiIndex {
    fn record_count(&self) -> usize {
        self.themes.len()
    }
}

/// Display metadata for a theme.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThemeMeta {
    pub name: String,
    pub category: String,
}

/// Theme id → display metadata, cached from the latest index snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThemeCatalog {
    entries: BTreeMap<String, ThemeMeta>,
}

impl ThemeCatalog {
    pub fn insert(&mut self, id: String, meta: ThemeMeta) {
        self.entries.insert(id, meta);
    }

    pub fn get(&self, id: &str) -> Option<&ThemeMeta> {
        self.entries.get(id)
    }

    /// Display name for a theme id, the id itself when unknown.
    pub fn name_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.entries.get(id).map(|m| m.name.as_str()).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
