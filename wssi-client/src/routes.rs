//! Ordered fallback attempts per resource kind.

use wssi_types::{DataTier, ResourceKind};

/// Where an attempt reads its payload from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Path on the API host.
    Api(String),
    /// Path on the static site hosting the analytics artifacts.
    Artifact(String),
    /// File name inside the bundled fallback directory.
    Bundle(String),
}

/// One candidate source in a fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub label: String,
    pub tier: DataTier,
    pub target: Target,
}

impl Attempt {
    pub fn new(label: impl Into<String>, tier: DataTier, target: Target) -> Self {
        Self {
            label: label.into(),
            tier,
            target,
        }
    }
}

/// Static artifact and bundle file name for a kind.
pub fn artifact_file(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Index => "wssi-latest.json",
        ResourceKind::History => "wssi-history.json",
        ResourceKind::Correlations => "correlations.json",
        ResourceKind::Alerts => "alerts.json",
        ResourceKind::Network => "network.json",
        ResourceKind::Patterns => "patterns.json",
    }
}

/// The four-tier chain for a kind: live v1 route, legacy route, static
/// analytics artifact, bundled sample.
///
/// `days` only affects the history routes.
pub fn attempts(kind: ResourceKind, days: u32) -> Vec<Attempt> {
    let (v1, legacy) = match kind {
        ResourceKind::Index => ("/api/v1/wssi".to_string(), "/wssi/current".to_string()),
        ResourceKind::History => (
            format!("/api/v1/wssi/history?days={}", days),
            format!("/wssi/history?days={}", days),
        ),
        other => (format!("/api/v1/{}", other.as_str()), format!("/{}", other.as_str())),
    };
    let file = artifact_file(kind);

    vec![
        Attempt::new("api-v1", DataTier::Primary, Target::Api(v1)),
        Attempt::new("api-legacy", DataTier::Legacy, Target::Api(legacy)),
        Attempt::new(
            "analytics-artifact",
            DataTier::Artifact,
            Target::Artifact(format!("/analytics/{}", file)),
        ),
        Attempt::new("local-fallback", DataTier::LocalFallback, Target::Bundle(file.to_string())),
    ]
}
