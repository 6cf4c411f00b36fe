//! Alert register records.

use chrono::{DateTime, Utc};

use crate::Usable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AlertSeverity {
    #[default]
    Unknown,
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => AlertSeverity::Critical,
            "warning" => AlertSeverity::Warning,
            "info" => AlertSeverity::Info,
            _ => AlertSeverity::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Unknown => "unknown",
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AlertStatus {
    Active,
    Resolved,
    #[default]
    Unknown,
}

impl AlertStatus {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "active" => AlertStatus::Active,
            "resolved" => AlertStatus::Resolved,
            _ => AlertStatus::Unknown,
        }
    }
}

/// Which upstream list an alert was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AlertBucket {
    Active,
    Recent,
    General,
}

/// A deduplicated alert.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AlertRecord {
    /// Explicit upstream id, or a composite of title, timestamp, severity and theme.
    pub id: String,
    pub title: String,
    pub message: Option<String>,
    pub alert_type: Option<String>,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub bucket: AlertBucket,
    pub triggered_at: Option<DateTime<Utc>>,
    /// Coarse relative label such as `5m ago`.
    pub relative_time: String,
    pub theme_ids: Vec<String>,
}

/// Merged alert list, first occurrence kept.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AlertFeed {
    pub alerts: Vec<AlertRecord>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl AlertFeed {
    pub fn active(&self) -> impl Iterator<Item = &AlertRecord> {
        self.alerts.iter().filter(|a| {
            a.status == AlertStatus::Active
                || (a.status == AlertStatus::Unknown && a.bucket == AlertBucket::Active)
        })
    }

    pub fn count_at_least(&self, severity: AlertSeverity) -> usize {
        self.alerts.iter().filter(|a| a.severity >= severity).count()
    }
}

impl Usable for AlertFeed {
    fn record_count(&self) -> usize {
        self.alerts.len()
    }
}
