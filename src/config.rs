//! Layered settings for the watcher.
//!
//! Values come from an optional config file, then `WSSI_*` environment
//! variables, then command-line flags applied by the binary.
//!
//! ```toml
//! api_base = "http://localhost:8000"
//! bundle_dir = "data/local-fallback"
//! refresh = "5m"
//! alert_refresh = "30s"
//!
//! [thresholds]
//! wssi_critical = 2.0
//! theme_watch = 1.0
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `WSSI_THRESHOLDS__WSSI_CRITICAL=2.5`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use wssi_client::{resolve_api_base, DashboardApiClient, DEFAULT_BUNDLE_DIR, DEFAULT_HISTORY_DAYS};

use crate::data::duration::parse_duration;
use crate::data::Thresholds;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "WSSI";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Explicit API base; wins over `page_host` detection.
    pub api_base: Option<String>,
    /// Host the dashboard page is served from, used to pick a default base.
    pub page_host: Option<String>,
    pub artifact_base: Option<String>,
    pub bundle_dir: PathBuf,
    pub api_key: Option<String>,
    pub tier: String,
    pub timeout: String,
    pub history_days: u32,
    pub refresh: String,
    pub alert_refresh: String,
    pub strong_threshold: f64,
    pub thresholds: Thresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: None,
            page_host: None,
            artifact_base: None,
            bundle_dir: PathBuf::from(DEFAULT_BUNDLE_DIR),
            api_key: None,
            tier: "free".to_string(),
            timeout: "10s".to_string(),
            history_days: DEFAULT_HISTORY_DAYS,
            refresh: "5m".to_string(),
            alert_refresh: "30s".to_string(),
            strong_threshold: 0.6,
            thresholds: Thresholds::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        config.try_deserialize().context("Invalid configuration")
    }

    pub fn validate(&self) -> Result<()> {
        self.timeout()?;
        self.refresh_interval()?;
        self.alert_interval()?;
        self.thresholds.validate()?;
        if self.history_days == 0 {
            anyhow::bail!("history_days must be at least 1");
        }
        Ok(())
    }

    /// API base after override and static-host resolution.
    pub fn resolved_api_base(&self) -> String {
        resolve_api_base(self.api_base.as_deref(), self.page_host.as_deref())
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(&self.timeout).with_context(|| format!("Invalid timeout '{}'", self.timeout))
    }

    /// Cadence for everything except alerts.
    pub fn refresh_interval(&self) -> Result<Duration> {
        non_zero(&self.refresh, "refresh")
    }

    pub fn alert_interval(&self) -> Result<Duration> {
        non_zero(&self.alert_refresh, "alert_refresh")
    }

    pub fn build_client(&self) -> Result<DashboardApiClient> {
        let mut builder = DashboardApiClient::builder()
            .api_base(self.resolved_api_base())
            .bundle_dir(&self.bundle_dir)
            .timeout(self.timeout()?)
            .strong_threshold(self.strong_threshold)
            .tier(self.tier.as_str());
        if let Some(base) = &self.artifact_base {
            builder = builder.artifact_base(base.as_str());
        }
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key.as_str());
        }
        Ok(builder.build()?)
    }
}

fn non_zero(raw: &str, name: &str) -> Result<Duration> {
    let d = parse_duration(raw).with_context(|| format!("Invalid {} '{}'", name, raw))?;
    if d.is_zero() {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(d)
}
