//! Snapshot - a normalized, source-attributed result for one resource kind.

use chrono::{DateTime, Utc};

use crate::Usable;

/// The logical resources the dashboard fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ResourceKind {
    Index,
    History,
    Correlations,
    Alerts,
    Network,
    Patterns,
}

impl ResourceKind {
    /// All kinds, in the order the dashboard refreshes them.
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Index,
        ResourceKind::History,
        ResourceKind::Correlations,
        ResourceKind::Alerts,
        ResourceKind::Network,
        ResourceKind::Patterns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Index => "index",
            ResourceKind::History => "history",
            ResourceKind::Correlations => "correlations",
            ResourceKind::Alerts => "alerts",
            ResourceKind::Network => "network",
            ResourceKind::Patterns => "patterns",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which fallback tier produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DataTier {
    /// Versioned live API route (`/api/v1/...`).
    Primary,
    /// Legacy unversioned API route.
    Legacy,
    /// Static analytics artifact published alongside the site.
    Artifact,
    /// Bundled local sample. Terminal: accepted even when empty.
    LocalFallback,
}

impl DataTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataTier::Primary => "primary",
            DataTier::Legacy => "legacy",
            DataTier::Artifact => "artifact",
            DataTier::LocalFallback => "local-fallback",
        }
    }

    /// Whether a result from this tier is accepted even when it is empty.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DataTier::LocalFallback)
    }
}

impl std::fmt::Display for DataTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized bundle of one resource kind, tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Snapshot<T> {
    pub kind: ResourceKind,
    /// Tier that produced the data.
    pub source: DataTier,
    /// Human-readable attempt label (e.g. `api-v1`).
    pub label: String,
    pub fetched_at: DateTime<Utc>,
    pub data: T,
}

impl<T: Usable> Snapshot<T> {
    /// Number of usable records in the payload.
    pub fn record_count(&self) -> usize {
        self.data.record_count()
    }

    /// True when the snapshot came from the bundled sample rather than a live source.
    pub fn is_degraded(&self) -> bool {
        self.source == DataTier::LocalFallback
    }
}
