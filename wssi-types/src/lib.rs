//! # wssi-types
//!
//! Canonical snapshot types for the WSSI polycrisis dashboard. Every upstream
//! payload, whichever fallback tier produced it, is normalized into one of
//! these shapes before a consumer sees it.
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde (camelCase field names, as the
//!   dashboard widgets expect)
//!
//! ## Example
//!
//! ```rust
//! use wssi_types::{StressLevel, Freshness};
//!
//! assert_eq!(StressLevel::from_z_score(2.5), StressLevel::Approaching);
//! assert!(StressLevel::Critical.rank() > StressLevel::Watch.rank());
//! assert_eq!(Freshness::from_age_hours(30.0), Freshness::Warning);
//! ```

mod access;
mod alert;
mod correlation;
mod history;
mod network;
mod pattern;
mod snapshot;
mod theme;

pub use access::*;
pub use alert::*;
pub use correlation::*;
pub use history::*;
pub use network::*;
pub use pattern::*;
pub use snapshot::*;
pub use theme::*;

/// Anything a fallback attempt can produce.
///
/// The fallback chain accepts a non-terminal result only when it carries at
/// least one usable record.
pub trait Usable {
    /// Number of usable records in the payload.
    fn record_count(&self) -> usize;

    /// True when the payload carries nothing worth showing.
    fn is_unusable(&self) -> bool {
        self.record_count() == 0
    }
}
