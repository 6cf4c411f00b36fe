//! Error types for the dashboard client.

use thiserror::Error;

use wssi_types::ResourceKind;

/// Why a single fallback attempt was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub label: String,
    pub reason: String,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.reason)
    }
}

fn render_failures(failures: &[AttemptFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while fetching dashboard snapshots.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Bundled fallback file could not be read.
    #[error("Failed to read bundled data: {0}")]
    Bundle(String),

    /// Relative route with no base URL to resolve it against.
    #[error("No base URL configured for {0}")]
    NoBase(String),

    /// Payload normalized to zero usable records.
    #[error("No usable {0} records")]
    Empty(ResourceKind),

    /// Every fallback attempt failed.
    #[error("All {kind} sources failed: {}", render_failures(.failures))]
    Exhausted {
        kind: ResourceKind,
        failures: Vec<AttemptFailure>,
    },

    /// Client could not be constructed.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_lists_every_attempt_in_order() {
        let err = ClientError::Exhausted {
            kind: ResourceKind::Alerts,
            failures: vec![
                AttemptFailure {
                    label: "api-v1".to_string(),
                    reason: "HTTP 503 from http://x/api/v1/alerts".to_string(),
                },
                AttemptFailure {
                    label: "local-fallback".to_string(),
                    reason: "Failed to read bundled data: missing".to_string(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "All alerts sources failed: api-v1: HTTP 503 from http://x/api/v1/alerts; \
             local-fallback: Failed to read bundled data: missing"
        );
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(
            ClientError::Empty(ResourceKind::Network).to_string(),
            "No usable network records"
        );
    }
}
