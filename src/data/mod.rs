//! Consumer-side processing of dashboard snapshots.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "30s", "5m")
//! - [`monitor`]: Threshold classification ([`Thresholds`], [`Reading`])
//! - [`history`]: Breach state across refreshes ([`BreachTracker`])
//! - [`dashboard`]: Latest snapshot per kind, summary and export ([`Dashboard`])
//!
//! ## Data Flow
//!
//! ```text
//! DashboardApiClient (fallback chain)
//!        │
//!        ▼
//! Dashboard::refresh_core() / refresh_alerts()
//!        │
//!        ├──▶ monitor::evaluate() (levels from Thresholds)
//!        │
//!        └──▶ BreachTracker::observe() (transitions only)
//! ```

pub mod dashboard;
pub mod duration;
pub mod history;
pub mod monitor;

pub use dashboard::{Dashboard, Summary, ThemeLine};
pub use history::{BreachTracker, SubjectState, Transition};
pub use monitor::{breaches, evaluate, Reading, Thresholds, WSSI_SUBJECT};
