//! Alert register normalization.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use wssi_types::{AlertBucket, AlertFeed, AlertRecord, AlertSeverity, AlertStatus};

use super::fields::{pick, pick_array, pick_string, string, string_list, unwrap_data};
use super::time::{parse_timestamp, relative_label};

/// Upstream lists in merge order.
const BUCKETS: &[(&str, AlertBucket)] = &[
    ("active_alerts", AlertBucket::Active),
    ("recent_alerts", AlertBucket::Recent),
    ("alerts", AlertBucket::General),
];

const ALERT_ID: &[&str] = &["id", "alert_id"];
const ALERT_TITLE: &[&str] = &["title", "message", "summary", "alert_type", "type"];
const ALERT_TIME: &[&str] = &["triggered_at", "timestamp", "created_at", "sent_at", "date"];
const ALERT_THEMES: &[&str] = &["theme_ids", "themes"];
const ALERT_THEME: &[&str] = &["theme_id", "theme"];

/// Merge every alert bucket into one deduplicated feed.
///
/// Records keep the first occurrence of each id; records without an explicit
/// id are keyed by title, timestamp, severity and theme.
pub fn normalize_alerts(raw: &Value, now: DateTime<Utc>) -> AlertFeed {
    let probe: Vec<&str> = BUCKETS.iter().map(|(key, _)| *key).collect();
    let scope = unwrap_data(raw, &probe);

    let mut seen = HashSet::new();
    let mut alerts = Vec::new();

    let mut merge = |rows: &[Value], bucket: AlertBucket| {
        for row in rows {
            if let Some(record) = alert_record(row, bucket, now) {
                if seen.insert(record.id.clone()) {
                    alerts.push(record);
                }
            }
        }
    };

    if let Some(rows) = scope.as_array() {
        merge(rows.as_slice(), AlertBucket::General);
    } else {
        for (key, bucket) in BUCKETS {
            if let Some(rows) = pick_array(scope, &[*key]) {
                merge(rows, *bucket);
            }
        }
    }

    AlertFeed {
        alerts,
        generated_at: pick(raw, &["generated_at", "timestamp"]).and_then(parse_timestamp),
    }
}

fn alert_record(row: &Value, bucket: AlertBucket, now: DateTime<Utc>) -> Option<AlertRecord> {
    if !row.is_object() {
        return None;
    }

    let title = pick_string(row, ALERT_TITLE).unwrap_or_else(|| "Untitled alert".to_string());
    let severity = pick_string(row, &["severity", "level"])
        .map(|s| AlertSeverity::from_label(&s))
        .unwrap_or_default();
    let raw_time = pick(row, ALERT_TIME);
    let triggered_at = raw_time.and_then(parse_timestamp);

    let mut theme_ids = pick(row, ALERT_THEMES).map(string_list).unwrap_or_default();
    if theme_ids.is_empty() {
        theme_ids.extend(pick_string(row, ALERT_THEME));
    }

    let id = pick_string(row, ALERT_ID).unwrap_or_else(|| {
        composite_key(
            &title,
            raw_time.and_then(string).as_deref().unwrap_or(""),
            severity,
            &theme_ids,
        )
    });

    Some(AlertRecord {
        id,
        title,
        message: pick_string(row, &["message", "description", "detail"]),
        alert_type: pick_string(row, &["alert_type", "type"]),
        severity,
        status: pick_string(row, &["status", "state"])
            .map(|s| AlertStatus::from_label(&s))
            .unwrap_or_default(),
        bucket,
        triggered_at,
        relative_time: relative_label(triggered_at, now),
        theme_ids,
    })
}

/// Identity for alerts that arrive without an id. Every theme id takes part.
pub fn composite_key(
    title: &str,
    timestamp: &str,
    severity: AlertSeverity,
    theme_ids: &[String],
) -> String {
    format!(
        "{}|{}|{}|{}",
        title,
        timestamp,
        severity.as_str(),
        theme_ids.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_composite_duplicates_collapse() {
        let alert = json!({
            "title": "Food System above threshold",
            "timestamp": "2026-03-10T11:00:00Z",
            "severity": "warning",
            "theme_id": "food-system"
        });
        let raw = json!({
            "active_alerts": [alert.clone()],
            "recent_alerts": [alert.clone()],
            "alerts": [alert]
        });
        let feed = normalize_alerts(&raw, now());

        assert_eq!(feed.alerts.len(), 1);
        let record = &feed.alerts[0];
        assert_eq!(record.bucket, AlertBucket::Active);
        assert_eq!(record.relative_time, "1h ago");
        assert_eq!(record.theme_ids, vec!["food-system".to_string()]);
        assert_eq!(
            record.id,
            "Food System above threshold|2026-03-10T11:00:00Z|warning|food-system"
        );
    }

    #[test]
    fn test_explicit_ids_win_and_first_occurrence_kept() {
        let raw = json!({
            "active_alerts": [{"id": 7, "title": "first", "severity": "critical", "status": "active"}],
            "recent_alerts": [
                {"alert_id": "7", "title": "second", "severity": "info", "status": "resolved"},
                {"alert_id": "8", "title": "other", "severity": "nonsense"}
            ]
        });
        let feed = normalize_alerts(&raw, now());

        assert_eq!(feed.alerts.len(), 2);
        assert_eq!(feed.alerts[0].title, "first");
        assert_eq!(feed.alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(feed.alerts[0].status, AlertStatus::Active);
        assert_eq!(feed.alerts[1].severity, AlertSeverity::Unknown);
        assert_eq!(feed.alerts[1].status, AlertStatus::Unknown);
        assert_eq!(feed.alerts[1].relative_time, "unknown time");
    }

    #[test]
    fn test_distinct_composites_are_kept() {
        let raw = json!({"alerts": [
            {"title": "x", "timestamp": "2026-03-10T11:00:00Z", "severity": "warning"},
            {"title": "x", "timestamp": "2026-03-10T11:00:00Z", "severity": "critical"},
            {"title": "x", "timestamp": "2026-03-10T11:00:00Z", "severity": "warning", "theme_ids": ["a", "b"]}
        ]});
        assert_eq!(normalize_alerts(&raw, now()).alerts.len(), 3);
    }

    #[test]
    fn test_composite_key_uses_every_theme() {
        let raw = json!({"alerts": [
            {"title": "x", "timestamp": "2026-03-10T11:00:00Z", "severity": "warning", "theme_ids": ["a", "b"]},
            {"title": "x", "timestamp": "2026-03-10T11:00:00Z", "severity": "warning", "theme_ids": ["a", "c"]},
            {"title": "x", "timestamp": "2026-03-10T11:00:00Z", "severity": "warning", "theme_ids": ["a", "b"]}
        ]});
        let feed = normalize_alerts(&raw, now());

        assert_eq!(feed.alerts.len(), 2);
        assert_eq!(feed.alerts[0].id, "x|2026-03-10T11:00:00Z|warning|a,b");
        assert_eq!(feed.alerts[1].id, "x|2026-03-10T11:00:00Z|warning|a,c");
    }

    #[test]
    fn test_bare_array_and_garbage() {
        let feed = normalize_alerts(&json!([{"title": "a"}, 5, null]), now());
        assert_eq!(feed.alerts.len(), 1);
        assert_eq!(feed.alerts[0].bucket, AlertBucket::General);

        assert!(normalize_alerts(&json!({"active_alerts": "none"}), now()).alerts.is_empty());
        assert!(normalize_alerts(&json!(null), now()).alerts.is_empty());
    }
}
