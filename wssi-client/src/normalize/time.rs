//! Timestamp parsing and relative-time labels.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp in any of the shapes the backend and artifacts emit.
///
/// Accepts RFC 3339, naive date-times (taken as UTC), bare `YYYY-MM-DD`
/// dates and Unix epochs (seconds, or milliseconds when large).
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s.trim()),
        Value::Number(n) => {
            let n = n.as_f64().filter(|n| n.is_finite())?;
            let millis = if n.abs() >= 1e12 { n } else { n * 1000.0 };
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Coarse human label for how far `at` is from `now`.
pub fn relative_label(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return "unknown time".to_string();
    };

    let delta = now.signed_duration_since(at).num_seconds();
    let magnitude = delta.unsigned_abs();
    if magnitude < 60 {
        return "just now".to_string();
    }

    let span = if magnitude < 3_600 {
        format!("{}m", magnitude / 60)
    } else if magnitude < 86_400 {
        format!("{}h", magnitude / 3_600)
    } else {
        format!("{}d", magnitude / 86_400)
    };

    if delta > 0 {
        format!("{} ago", span)
    } else {
        format!("in {}", span)
    }
}

/// Hours elapsed between `at` and `now`.
pub fn age_hours(at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    now.signed_duration_since(at).num_seconds() as f64 / 3_600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_shapes() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp(&json!("2026-03-09")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2026-03-09T00:00:00Z")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2026-03-09T02:00:00+02:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2026-03-09 00:00:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2026-03-09T00:00:00.000")), Some(expected));
        assert_eq!(parse_timestamp(&json!(expected.timestamp())), Some(expected));
        assert_eq!(parse_timestamp(&json!(expected.timestamp_millis())), Some(expected));
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&json!(null)), None);
    }

    #[test]
    fn test_relative_labels() {
        let now = now();
        assert_eq!(relative_label(Some(now - Duration::seconds(30)), now), "just now");
        assert_eq!(relative_label(Some(now - Duration::minutes(5)), now), "5m ago");
        assert_eq!(relative_label(Some(now - Duration::hours(3)), now), "3h ago");
        assert_eq!(relative_label(Some(now - Duration::days(2)), now), "2d ago");
        assert_eq!(relative_label(Some(now + Duration::minutes(10)), now), "in 10m");
        assert_eq!(relative_label(Some(now + Duration::days(1)), now), "in 1d");
        assert_eq!(relative_label(None, now), "unknown time");
    }
}
