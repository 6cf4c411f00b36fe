//! # wssi-watch
//!
//! Polling consumer for the WSSI polycrisis dashboard API.
//!
//! Snapshots are fetched through [`wssi_client::DashboardApiClient`], which
//! walks each resource's fallback chain. This crate keeps the latest
//! snapshot per kind, classifies the headline index and its themes against
//! alert thresholds, and reports breach transitions between refreshes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │  config      │───▶│ DashboardApiClient│───▶│ data::Dashboard │
//! │ (file, env)  │    │ (fallback chain)  │    │ (latest per kind)│
//! └──────────────┘    └──────────────────┘    └────────┬────────┘
//!                                                      │
//!                               ┌──────────────────────┼──────────────┐
//!                               ▼                      ▼              ▼
//!                        monitor::evaluate      BreachTracker    Summary / export
//! ```
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the local API, index every 5 minutes and alerts every 30 seconds
//! wssi-watch --api-base http://localhost:8000
//!
//! # One refresh, printed
//! wssi-watch --once
//!
//! # Export everything to JSON
//! wssi-watch --export snapshot.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use wssi_watch::{Dashboard, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::default();
//! let client = settings.build_client().unwrap();
//! let mut dashboard = Dashboard::new(client, settings.history_days, settings.thresholds.clone());
//!
//! for transition in dashboard.refresh_all().await {
//!     println!("{} -> {}", transition.label, transition.to);
//! }
//! println!("{}", dashboard.summary());
//! # });
//! ```

pub mod config;
pub mod data;

pub use config::Settings;
pub use data::{BreachTracker, Dashboard, Reading, Summary, Thresholds, Transition};
