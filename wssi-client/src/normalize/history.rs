//! Historical series normalization.

use serde_json::Value;

use wssi_types::{HistoryPoint, HistorySeries, StressBand};

use super::fields::{pick, pick_array, pick_number, unwrap_data};
use super::time::parse_timestamp;

const POINT_LISTS: &[&str] = &["history", "points", "series", "items"];
const POINT_TIME: &[&str] = &["date", "timestamp", "as_of", "calculated_at"];

/// Normalize a history payload into an ascending series.
///
/// Rows without a parseable date cannot be placed on the time axis and are
/// dropped.
pub fn normalize_history(raw: &Value, days: u32) -> HistorySeries {
    let scope = unwrap_data(raw, POINT_LISTS);

    let rows: &[Value] = match raw.as_array().or_else(|| scope.as_array()) {
        Some(rows) => rows,
        None => pick_array(scope, POINT_LISTS).unwrap_or(&[]),
    };

    let mut points: Vec<HistoryPoint> = rows
        .iter()
        .filter(|row| row.is_object())
        .filter_map(|row| {
            let timestamp = pick(row, POINT_TIME).and_then(parse_timestamp)?;
            let wssi_score = pick_number(row, &["wssi_score", "score"]);
            Some(HistoryPoint {
                timestamp,
                wssi_value: pick_number(row, &["wssi_value", "value"]),
                wssi_score,
                band: StressBand::from_score(wssi_score),
            })
        })
        .collect();

    points.sort_by_key(|p| p.timestamp);

    HistorySeries {
        points,
        days,
        current: pick_number(scope, &["current", "current_value"]),
    }
}
