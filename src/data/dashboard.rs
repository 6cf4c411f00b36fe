//! Latest snapshot per resource kind, plus summary and export views.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use wssi_client::{ClientError, DashboardApiClient};
use wssi_types::{
    AlertFeed, AlertSeverity, CorrelationMatrix, Freshness, HistorySeries, NetworkGraph,
    PatternSet, ResourceKind, Snapshot, StressLevel, WssiIndex,
};

use super::history::{BreachTracker, Transition};
use super::monitor::{breaches, evaluate, Reading, Thresholds};

/// One theme line in the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeLine {
    pub theme_id: String,
    pub theme_name: String,
    pub stress_level: StressLevel,
    pub stress_score: Option<f64>,
    pub freshness: Freshness,
}

/// Condensed view of the dashboard for printing or export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub wssi_value: Option<f64>,
    pub wssi_score: Option<f64>,
    pub stress_level: StressLevel,
    pub calculated_at: Option<DateTime<Utc>>,
    /// Most stressed first, then freshest.
    pub themes: Vec<ThemeLine>,
    pub breaches: Vec<Reading>,
    pub score_change: Option<f64>,
    pub active_alerts: usize,
    pub critical_alerts: usize,
    pub strong_correlations: usize,
    pub network_nodes: usize,
    pub top_pattern: Option<String>,
    /// Attempt label that served each kind.
    pub sources: BTreeMap<ResourceKind, String>,
    /// Kinds served from the bundled sample.
    pub degraded: Vec<ResourceKind>,
    pub errors: BTreeMap<ResourceKind, String>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self
            .wssi_value
            .map_or_else(|| "n/a".to_string(), |v| format!("{:+.2}", v));
        write!(f, "WSSI {} [{}]", value, self.stress_level)?;
        if let Some(score) = self.wssi_score {
            write!(f, " score {:.1}", score)?;
        }
        if let Some(change) = self.score_change {
            write!(f, " ({:+.1} over window)", change)?;
        }
        writeln!(f)?;

        for theme in &self.themes {
            let score = theme
                .stress_score
                .map_or_else(|| "   n/a".to_string(), |z| format!("{:+6.2}", z));
            writeln!(
                f,
                "  {:<12} {} {:<32} {}",
                theme.stress_level.as_str(),
                score,
                theme.theme_name,
                theme.freshness.as_str()
            )?;
        }

        writeln!(
            f,
            "Alerts: {} active ({} critical) | Strong correlations: {} | Network nodes: {}",
            self.active_alerts, self.critical_alerts, self.strong_correlations, self.network_nodes
        )?;
        if let Some(pattern) = &self.top_pattern {
            writeln!(f, "Closest analog: {}", pattern)?;
        }
        if !self.degraded.is_empty() {
            let kinds: Vec<&str> = self.degraded.iter().map(|k| k.as_str()).collect();
            writeln!(f, "Using bundled sample data for: {}", kinds.join(", "))?;
        }
        for (kind, error) in &self.errors {
            writeln!(f, "Unavailable {}: {}", kind, error)?;
        }
        Ok(())
    }
}

/// Holds the latest snapshot and error for every resource kind.
///
/// A failed refresh keeps the previous snapshot so a transient outage does
/// not blank the view.
#[derive(Debug)]
pub struct Dashboard {
    client: DashboardApiClient,
    history_days: u32,
    thresholds: Thresholds,
    tracker: BreachTracker,
    pub index: Option<Snapshot<WssiIndex>>,
    pub history: Option<Snapshot<HistorySeries>>,
    pub correlations: Option<Snapshot<CorrelationMatrix>>,
    pub alerts: Option<Snapshot<AlertFeed>>,
    pub network: Option<Snapshot<NetworkGraph>>,
    pub patterns: Option<Snapshot<PatternSet>>,
    errors: BTreeMap<ResourceKind, String>,
    last_refresh: Option<DateTime<Utc>>,
}

fn store<T>(
    slot: &mut Option<Snapshot<T>>,
    errors: &mut BTreeMap<ResourceKind, String>,
    kind: ResourceKind,
    result: Result<Snapshot<T>, ClientError>,
) -> bool {
    match result {
        Ok(snapshot) => {
            errors.remove(&kind);
            *slot = Some(snapshot);
            true
        }
        Err(e) => {
            warn!(kind = %kind, "Refresh failed: {}", e);
            errors.insert(kind, e.to_string());
            false
        }
    }
}

impl Dashboard {
    pub fn new(client: DashboardApiClient, history_days: u32, thresholds: Thresholds) -> Self {
        Self {
            client,
            history_days,
            thresholds,
            tracker: BreachTracker::new(),
            index: None,
            history: None,
            correlations: None,
            alerts: None,
            network: None,
            patterns: None,
            errors: BTreeMap::new(),
            last_refresh: None,
        }
    }

    pub fn errors(&self) -> &BTreeMap<ResourceKind, String> {
        &self.errors
    }

    /// True once any kind holds a snapshot.
    pub fn has_data(&self) -> bool {
        self.index.is_some()
            || self.history.is_some()
            || self.correlations.is_some()
            || self.alerts.is_some()
            || self.network.is_some()
            || self.patterns.is_some()
    }

    /// Refresh every kind except alerts.
    ///
    /// The index goes first so the correlation and network calls see a
    /// fresh theme catalog. Returns breach transitions from the new index.
    pub async fn refresh_core(&mut self) -> Vec<Transition> {
        let mut transitions = Vec::new();

        let result = self.client.index().await;
        if store(&mut self.index, &mut self.errors, ResourceKind::Index, result) {
            transitions = self.track_breaches();
        }

        let result = self.client.history(self.history_days).await;
        store(&mut self.history, &mut self.errors, ResourceKind::History, result);

        let result = self.client.correlations().await;
        store(&mut self.correlations, &mut self.errors, ResourceKind::Correlations, result);

        let result = self.client.network().await;
        store(&mut self.network, &mut self.errors, ResourceKind::Network, result);

        let result = self.client.patterns().await;
        store(&mut self.patterns, &mut self.errors, ResourceKind::Patterns, result);

        self.last_refresh = Some(Utc::now());
        transitions
    }

    pub async fn refresh_alerts(&mut self) {
        let result = self.client.alerts().await;
        store(&mut self.alerts, &mut self.errors, ResourceKind::Alerts, result);
        self.last_refresh = Some(Utc::now());
    }

    pub async fn refresh_all(&mut self) -> Vec<Transition> {
        let transitions = self.refresh_core().await;
        self.refresh_alerts().await;
        transitions
    }

    fn track_breaches(&mut self) -> Vec<Transition> {
        let Some(index) = &self.index else {
            return Vec::new();
        };
        let readings = evaluate(&index.data, &self.thresholds);
        let transitions = self.tracker.observe(&readings, Utc::now());

        for t in &transitions {
            if t.is_escalation() {
                warn!(
                    subject = %t.subject,
                    value = t.value,
                    "{} moved from {} to {}",
                    t.label,
                    t.from,
                    t.to
                );
            } else {
                info!(subject = %t.subject, value = t.value, "{} eased from {} to {}", t.label, t.from, t.to);
            }
        }
        transitions
    }

    pub fn summary(&self) -> Summary {
        let index = self.index.as_ref().map(|s| &s.data);

        let themes = index
            .map(|i| {
                i.themes_by_severity()
                    .into_iter()
                    .map(|t| ThemeLine {
                        theme_id: t.theme_id.clone(),
                        theme_name: t.theme_name.clone(),
                        stress_level: t.stress_level,
                        stress_score: t.stress_score,
                        freshness: t.freshness,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let readings = index
            .map(|i| evaluate(i, &self.thresholds))
            .unwrap_or_default();

        let mut sources = BTreeMap::new();
        let mut degraded = Vec::new();
        let mut note = |kind: ResourceKind, label: &str, is_degraded: bool| {
            sources.insert(kind, label.to_string());
            if is_degraded {
                degraded.push(kind);
            }
        };
        if let Some(s) = &self.index {
            note(s.kind, &s.label, s.is_degraded());
        }
        if let Some(s) = &self.history {
            note(s.kind, &s.label, s.is_degraded());
        }
        if let Some(s) = &self.correlations {
            note(s.kind, &s.label, s.is_degraded());
        }
        if let Some(s) = &self.alerts {
            note(s.kind, &s.label, s.is_degraded());
        }
        if let Some(s) = &self.network {
            note(s.kind, &s.label, s.is_degraded());
        }
        if let Some(s) = &self.patterns {
            note(s.kind, &s.label, s.is_degraded());
        }

        let alerts = self.alerts.as_ref().map(|s| &s.data);

        Summary {
            wssi_value: index.and_then(|i| i.wssi_value),
            wssi_score: index.and_then(|i| i.wssi_score),
            stress_level: index.map(|i| i.stress_level).unwrap_or_default(),
            calculated_at: index.and_then(|i| i.calculated_at),
            themes,
            breaches: breaches(&readings).into_iter().cloned().collect(),
            score_change: self.history.as_ref().and_then(|s| s.data.score_change()),
            active_alerts: alerts.map(|a| a.active().count()).unwrap_or(0),
            critical_alerts: alerts
                .map(|a| a.count_at_least(AlertSeverity::Critical))
                .unwrap_or(0),
            strong_correlations: self
                .correlations
                .as_ref()
                .map(|s| s.data.strong_pairs().len())
                .unwrap_or(0),
            network_nodes: self.network.as_ref().map(|s| s.data.nodes.len()).unwrap_or(0),
            top_pattern: self.patterns.as_ref().and_then(|s| {
                s.data
                    .top()
                    .map(|m| format!("{} ({:.0}% similar)", m.label, m.similarity_pct))
            }),
            sources,
            degraded,
            errors: self.errors.clone(),
        }
    }

    /// Full export document: summary, every snapshot and the current errors.
    pub fn export(&self) -> Result<serde_json::Value> {
        Ok(json!({
            "exported_at": Utc::now(),
            "last_refresh": self.last_refresh,
            "summary": serde_json::to_value(self.summary())?,
            "snapshots": {
                "index": serde_json::to_value(&self.index)?,
                "history": serde_json::to_value(&self.history)?,
                "correlations": serde_json::to_value(&self.correlations)?,
                "alerts": serde_json::to_value(&self.alerts)?,
                "network": serde_json::to_value(&self.network)?,
                "patterns": serde_json::to_value(&self.patterns)?,
            },
        }))
    }

    /// Write the export document as pretty JSON.
    pub fn write_export(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.export()?)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
