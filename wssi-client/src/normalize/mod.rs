//! Payload normalizers.
//!
//! Each normalizer takes whatever JSON a fallback tier returned and produces
//! the canonical type for its resource kind. None of them can fail: missing
//! or malformed fields become defaults and unusable rows are dropped.
//!
//! ```text
//! serde_json::Value (raw)
//!        │
//!        ▼
//! fields::pick_* (alias tables + coercion guards)
//!        │
//!        ▼
//! WssiIndex | HistorySeries | CorrelationMatrix | AlertFeed | NetworkGraph | PatternSet
//! ```

pub mod fields;
pub mod time;

mod alerts;
mod correlations;
mod history;
mod index;
mod network;
mod patterns;

pub use alerts::{composite_key, normalize_alerts};
pub use correlations::normalize_correlations;
pub use history::normalize_history;
pub use index::{normalize_index, DEFAULT_CATEGORY};
pub use network::{layout_hash, layout_position, normalize_network, LAYOUT_CENTER};
pub use patterns::normalize_patterns;
