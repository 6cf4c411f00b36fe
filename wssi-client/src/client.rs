//! The fallback-chain dashboard client.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use wssi_types::{
    AccessTier, AlertFeed, CorrelationMatrix, HistorySeries, NetworkGraph, PatternSet,
    ResourceKind, Snapshot, ThemeCatalog, Usable, WssiIndex, DEFAULT_STRONG_THRESHOLD,
};

use crate::base::join_url;
use crate::error::{AttemptFailure, ClientError};
use crate::normalize;
use crate::routes::{attempts, Attempt, Target};

/// Header carrying the caller's API key (`X-API-Key`).
pub const API_KEY_HEADER: &str = "x-api-key";

/// Default directory holding the bundled sample payloads.
pub const DEFAULT_BUNDLE_DIR: &str = "data/local-fallback";

/// Default history window in days.
pub const DEFAULT_HISTORY_DAYS: u32 = 90;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Map a tier name, including legacy names, onto the canonical four tiers.
pub fn normalize_tier(raw: &str) -> AccessTier {
    AccessTier::normalize(raw)
}

#[derive(Debug, Clone, Default)]
struct AuthState {
    api_key: Option<String>,
    tier: AccessTier,
}

/// Result of probing the backend's `/health` route.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub url: String,
    pub http_status: u16,
    /// `status` field of the body, or `ok` when the body has none.
    pub status: String,
    pub version: Option<String>,
    pub latency: Duration,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy" | "up")
    }
}

/// Client that walks each resource kind's fallback chain and returns
/// normalized snapshots.
///
/// The only state kept between calls is the auth fields and the theme
/// catalog from the latest non-empty index.
#[derive(Debug)]
pub struct DashboardApiClient {
    client: Client,
    api_base: String,
    artifact_base: String,
    bundle_dir: PathBuf,
    timeout: Duration,
    strong_threshold: f64,
    auth: RwLock<AuthState>,
    catalog: RwLock<ThemeCatalog>,
}

impl DashboardApiClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> DashboardApiClientBuilder {
        DashboardApiClientBuilder::default()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn bundle_dir(&self) -> &Path {
        &self.bundle_dir
    }

    /// Current headline index. A non-empty result refreshes the theme catalog.
    pub async fn index(&self) -> Result<Snapshot<WssiIndex>, ClientError> {
        let snapshot = self
            .fetch_chain(ResourceKind::Index, attempts(ResourceKind::Index, 0), |raw| {
                normalize::normalize_index(raw, Utc::now())
            })
            .await?;

        if !snapshot.data.themes.is_empty() {
            *self.catalog.write() = snapshot.data.catalog();
        }

        Ok(snapshot)
    }

    /// Index history for the last `days` days.
    pub async fn history(&self, days: u32) -> Result<Snapshot<HistorySeries>, ClientError> {
        self.fetch_chain(ResourceKind::History, attempts(ResourceKind::History, days), |raw| {
            normalize::normalize_history(raw, days)
        })
        .await
    }

    /// Theme correlation matrix, labelled from the cached catalog.
    pub async fn correlations(&self) -> Result<Snapshot<CorrelationMatrix>, ClientError> {
        let catalog = self.theme_catalog();
        let threshold = self.strong_threshold;
        self.fetch_chain(
            ResourceKind::Correlations,
            attempts(ResourceKind::Correlations, 0),
            |raw| normalize::normalize_correlations(raw, &catalog, threshold),
        )
        .await
    }

    pub async fn alerts(&self) -> Result<Snapshot<AlertFeed>, ClientError> {
        self.fetch_chain(ResourceKind::Alerts, attempts(ResourceKind::Alerts, 0), |raw| {
            normalize::normalize_alerts(raw, Utc::now())
        })
        .await
    }

    /// Theme network, labelled from the cached catalog.
    pub async fn network(&self) -> Result<Snapshot<NetworkGraph>, ClientError> {
        let catalog = self.theme_catalog();
        self.fetch_chain(ResourceKind::Network, attempts(ResourceKind::Network, 0), |raw| {
            normalize::normalize_network(raw, &catalog)
        })
        .await
    }

    pub async fn patterns(&self) -> Result<Snapshot<PatternSet>, ClientError> {
        self.fetch_chain(ResourceKind::Patterns, attempts(ResourceKind::Patterns, 0), |raw| {
            normalize::normalize_patterns(raw)
        })
        .await
    }

    /// Probe `GET /health` on the API base. No fallback applies.
    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        if self.api_base.is_empty() {
            return Err(ClientError::NoBase("health".to_string()));
        }
        let url = join_url(&self.api_base, "/health");
        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .headers(self.request_headers())
            .timeout(self.timeout)
            .send()
            .await?;

        let http_status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: http_status,
                url,
            });
        }

        // Some deployments answer with plain text.
        let body: Value = response.json().await.unwrap_or(Value::Null);
        Ok(HealthReport {
            url,
            http_status,
            status: normalize::fields::pick_string(&body, &["status"])
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or_else(|| "ok".to_string()),
            version: normalize::fields::pick_string(&body, &["version"]),
            latency: started.elapsed(),
        })
    }

    /// Set the API key and access tier used to decorate requests.
    ///
    /// A blank key clears it. The tier name is normalized.
    pub fn set_auth(&self, api_key: Option<&str>, tier: &str) {
        let mut auth = self.auth.write();
        auth.api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        auth.tier = normalize_tier(tier);
        debug!(tier = %auth.tier, has_key = auth.api_key.is_some(), "Updated client auth");
    }

    pub fn clear_auth(&self) {
        *self.auth.write() = AuthState::default();
    }

    pub fn api_key(&self) -> Option<String> {
        self.auth.read().api_key.clone()
    }

    pub fn tier(&self) -> AccessTier {
        self.auth.read().tier
    }

    /// Copy of the catalog cached from the latest non-empty index.
    pub fn theme_catalog(&self) -> ThemeCatalog {
        self.catalog.read().clone()
    }

    async fn fetch_chain<T, F>(
        &self,
        kind: ResourceKind,
        chain: Vec<Attempt>,
        normalize: F,
    ) -> Result<Snapshot<T>, ClientError>
    where
        T: Usable,
        F: Fn(&Value) -> T,
    {
        let mut failures = Vec::with_capacity(chain.len());

        for attempt in chain {
            let reason = match self.load(&attempt).await {
                Ok(raw) => {
                    let data = normalize(&raw);
                    if !data.is_unusable() || attempt.tier.is_terminal() {
                        debug!(
                            kind = %kind,
                            label = %attempt.label,
                            records = data.record_count(),
                            "Accepted snapshot"
                        );
                        return Ok(Snapshot {
                            kind,
                            source: attempt.tier,
                            label: attempt.label,
                            fetched_at: Utc::now(),
                            data,
                        });
                    }
                    ClientError::Empty(kind).to_string()
                }
                Err(e) => e.to_string(),
            };

            debug!(kind = %kind, label = %attempt.label, reason = %reason, "Fallback attempt failed");
            failures.push(AttemptFailure {
                label: attempt.label,
                reason,
            });
        }

        let err = ClientError::Exhausted { kind, failures };
        warn!("{}", err);
        Err(err)
    }

    async fn load(&self, attempt: &Attempt) -> Result<Value, ClientError> {
        match &attempt.target {
            Target::Api(path) => self.get_json(&self.api_base, path, &attempt.label).await,
            Target::Artifact(path) => {
                let base = if self.artifact_base.is_empty() {
                    &self.api_base
                } else {
                    &self.artifact_base
                };
                self.get_json(base, path, &attempt.label).await
            }
            Target::Bundle(file) => self.read_bundle(file).await,
        }
    }

    async fn get_json(&self, base: &str, path: &str, label: &str) -> Result<Value, ClientError> {
        if base.is_empty() {
            return Err(ClientError::NoBase(label.to_string()));
        }
        let url = join_url(base, path);

        // One deadline covers connect, headers and body.
        match tokio::time::timeout(self.timeout, self.fetch_json(&url)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(format!(
                "{} after {}ms",
                url,
                self.timeout.as_millis()
            ))),
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, ClientError> {
        let response = self
            .client
            .get(url)
            .headers(self.request_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::from(e)
                } else {
                    ClientError::Parse(format!("{}: {}", url, e))
                }
            })
    }

    async fn read_bundle(&self, file: &str) -> Result<Value, ClientError> {
        let path = self.bundle_dir.join(file);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ClientError::Bundle(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ClientError::Parse(format!("{}: {}", path.display(), e)))
    }

    fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = self.auth.read().api_key.as_deref() {
            match HeaderValue::from_str(key) {
                Ok(value) => {
                    headers.insert(API_KEY_HEADER, value);
                }
                Err(_) => warn!("API key contains invalid header characters; sending without it"),
            }
        }
        headers
    }
}

/// Builder for DashboardApiClient.
#[derive(Debug, Default)]
pub struct DashboardApiClientBuilder {
    api_base: Option<String>,
    artifact_base: Option<String>,
    bundle_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    strong_threshold: Option<f64>,
    api_key: Option<String>,
    tier: Option<String>,
}

impl DashboardApiClientBuilder {
    /// Set the API base URL (e.g. "http://localhost:8000"). Empty means relative
    /// paths, which a native client cannot follow, so HTTP tiers are skipped.
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set the static site serving `/analytics/*.json` (default: the API base).
    pub fn artifact_base(mut self, base: impl Into<String>) -> Self {
        self.artifact_base = Some(base.into());
        self
    }

    /// Set the bundled sample directory (default: "data/local-fallback").
    pub fn bundle_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundle_dir = Some(dir.into());
        self
    }

    /// Set the per-request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the default |r| cutoff for strong correlations (default: 0.6).
    pub fn strong_threshold(mut self, threshold: f64) -> Self {
        self.strong_threshold = Some(threshold);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DashboardApiClient, ClientError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ClientError::Config("timeout must be non-zero".to_string()));
        }

        let strong_threshold = self.strong_threshold.unwrap_or(DEFAULT_STRONG_THRESHOLD);
        if !(strong_threshold > 0.0 && strong_threshold <= 1.0) {
            return Err(ClientError::Config(format!(
                "strong threshold must be in (0, 1], got {}",
                strong_threshold
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let trim_base = |b: Option<String>| {
            b.map(|b| b.trim().trim_end_matches('/').to_string())
                .unwrap_or_default()
        };

        let dashboard = DashboardApiClient {
            client,
            api_base: trim_base(self.api_base),
            artifact_base: trim_base(self.artifact_base),
            bundle_dir: self
                .bundle_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLE_DIR)),
            timeout,
            strong_threshold,
            auth: RwLock::new(AuthState::default()),
            catalog: RwLock::new(ThemeCatalog::default()),
        };

        if self.api_key.is_some() || self.tier.is_some() {
            dashboard.set_auth(self.api_key.as_deref(), self.tier.as_deref().unwrap_or_default());
        }

        Ok(dashboard)
    }
}
