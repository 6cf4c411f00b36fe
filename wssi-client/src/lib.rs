//! # wssi-client
//!
//! Fallback-chain client for the WSSI dashboard API.
//!
//! Each resource kind (index, history, correlations, alerts, network,
//! patterns) is fetched by walking an ordered list of sources until one
//! yields usable data:
//!
//! 1. **api-v1**: versioned route on the API host (`/api/v1/...`)
//! 2. **api-legacy**: unversioned route on the same host
//! 3. **analytics-artifact**: static JSON published under `/analytics/`
//! 4. **local-fallback**: bundled sample on disk, accepted even when empty
//!
//! Whatever shape a source returns is normalized into the types from
//! [`wssi_types`]. Malformed fields become defaults; they never fail a fetch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wssi_client::DashboardApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DashboardApiClient::builder()
//!         .api_base("http://localhost:8000")
//!         .bundle_dir("data/local-fallback")
//!         .build()?;
//!
//!     let index = client.index().await?;
//!     println!("{} themes via {}", index.record_count(), index.label);
//!
//!     // Labelled using the catalog cached by the index call
//!     let matrix = client.correlations().await?;
//!     println!("{} strong pairs", matrix.data.strong_pairs().len());
//!     Ok(())
//! }
//! ```

pub mod base;
pub mod client;
pub mod error;
pub mod normalize;
pub mod routes;

pub use base::{resolve_api_base, PRODUCTION_API_BASE};
pub use client::{
    normalize_tier, DashboardApiClient, DashboardApiClientBuilder, HealthReport,
    DEFAULT_BUNDLE_DIR, DEFAULT_HISTORY_DAYS,
};
pub use error::{AttemptFailure, ClientError};

// Re-export types for convenience
pub use wssi_types::{
    AccessTier, AlertFeed, CorrelationMatrix, DataTier, HistorySeries, NetworkGraph, PatternSet,
    ResourceKind, Snapshot, ThemeCatalog, WssiIndex,
};
