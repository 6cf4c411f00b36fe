//! Subscription tiers used to gate API access.

/// The four tiers the backend issues keys for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AccessTier {
    #[default]
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl AccessTier {
    /// Map a tier name, including legacy names, onto the canonical set.
    ///
    /// Unrecognized names fall back to `Free`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "basic" | "starter" => AccessTier::Basic,
            "pro" | "professional" | "premium" => AccessTier::Pro,
            "enterprise" | "team" | "business" | "institutional" => AccessTier::Enterprise,
            _ => AccessTier::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTier::Free => "free",
            AccessTier::Basic => "basic",
            AccessTier::Pro => "pro",
            AccessTier::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for AccessTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_names() {
        assert_eq!(AccessTier::normalize("starter"), AccessTier::Basic);
        assert_eq!(AccessTier::normalize("Professional"), AccessTier::Pro);
        assert_eq!(AccessTier::normalize("premium"), AccessTier::Pro);
        assert_eq!(AccessTier::normalize("institutional"), AccessTier::Enterprise);
        assert_eq!(AccessTier::normalize("enterprise"), AccessTier::Enterprise);
        assert_eq!(AccessTier::normalize(""), AccessTier::Free);
        assert_eq!(AccessTier::normalize("gold"), AccessTier::Free);
    }
}
