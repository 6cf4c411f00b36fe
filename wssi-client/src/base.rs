//! API base URL resolution.

/// Public production API used when the dashboard is served from static hosting.
pub const PRODUCTION_API_BASE: &str = "https://api.wssi.example";

/// Static hosting domains that have no API of their own.
pub const STATIC_HOSTING_SUFFIXES: &[&str] = &[".github.io", ".pages.dev", ".netlify.app", ".vercel.app"];

/// Resolve the API base URL.
///
/// An explicit override wins. Otherwise a page served from a known static
/// host talks to the production API, and anything else uses relative paths
/// (an empty base).
pub fn resolve_api_base(override_base: Option<&str>, page_host: Option<&str>) -> String {
    if let Some(base) = override_base.map(str::trim).filter(|b| !b.is_empty()) {
        return base.trim_end_matches('/').to_string();
    }

    let on_static_host = page_host
        .map(|h| h.trim().to_ascii_lowercase())
        .is_some_and(|host| STATIC_HOSTING_SUFFIXES.iter().any(|s| host.ends_with(s)));

    if on_static_host {
        PRODUCTION_API_BASE.to_string()
    } else {
        String::new()
    }
}

/// Join a base URL and an absolute path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        assert_eq!(
            resolve_api_base(Some(" http://localhost:8000/ "), Some("dash.github.io")),
            "http://localhost:8000"
        );
    }

    #[test]
    fn test_static_host_uses_production() {
        assert_eq!(resolve_api_base(None, Some("polycrisis.github.io")), PRODUCTION_API_BASE);
        assert_eq!(resolve_api_base(Some("  "), Some("site.pages.dev")), PRODUCTION_API_BASE);
    }

    #[test]
    fn test_otherwise_relative() {
        assert_eq!(resolve_api_base(None, Some("localhost")), "");
        assert_eq!(resolve_api_base(None, None), "");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h:1/", "/api/v1/wssi"), "http://h:1/api/v1/wssi");
        assert_eq!(join_url("http://h:1", "wssi/current"), "http://h:1/wssi/current");
    }
}
