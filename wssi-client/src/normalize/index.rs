//! Headline index and theme signal normalization.

use chrono::{DateTime, Utc};
use serde_json::Value;

use wssi_types::{
    bar_ratio, Freshness, IndicatorDetail, QualityTier, StressLevel, ThemeSignal, Trend, WssiIndex,
};

use super::fields::{
    pick, pick_array, pick_count, pick_number, pick_string, slugify, unwrap_data,
};
use super::time::{age_hours, parse_timestamp};

const THEME_LIST: &[&str] = &["theme_signals", "themes", "themeSignals"];

const HEADLINE_TIMESTAMP: &[&str] = &["calculation_timestamp", "generated_at", "timestamp"];

const THEME_ID: &[&str] = &["theme_id", "id", "slug"];
const THEME_NAME: &[&str] = &["theme_name", "name", "label", "title"];
const THEME_CATEGORY: &[&str] = &["category", "domain", "group"];
const THEME_Z: &[&str] = &["mean_z_score", "z_score", "normalized_value", "stress_score", "zscore"];
const THEME_LEVEL: &[&str] = &["stress_level", "status", "level"];
const THEME_TREND: &[&str] = &["trend", "direction"];
const THEME_MOMENTUM: &[&str] = &["momentum_30d", "momentum", "delta_30d"];
const THEME_QUALITY: &[&str] = &["quality_tier", "confidence_tier", "data_quality", "confidence"];
const THEME_FRESHNESS: &[&str] = &["freshness", "freshness_state", "data_freshness"];
const THEME_AGE: &[&str] = &["data_age_hours", "age_hours", "hours_since_update"];
const THEME_UPDATED: &[&str] = &["last_updated", "updated_at", "latest_date", "as_of"];
const THEME_INDICATORS: &[&str] = &["indicator_details", "indicators"];

const INDICATOR_ID: &[&str] = &["indicator_id", "id"];
const INDICATOR_NAME: &[&str] = &["indicator_name", "name", "label"];

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Normalize a headline index payload.
///
/// Theme rows are located under any accepted key, at the top level or
/// nested under `data`, or as a bare array. Rows without any identity are
/// dropped; every other field falls back to a safe default.
pub fn normalize_index(raw: &Value, now: DateTime<Utc>) -> WssiIndex {
    let scope = unwrap_data(raw, THEME_LIST);

    let themes: Vec<ThemeSignal> = theme_rows(raw)
        .iter()
        .filter_map(|row| theme_signal(row, now))
        .collect();

    let wssi_value = headline_number(raw, scope, &["wssi_value", "value"]);
    let wssi_delta = headline_number(raw, scope, &["wssi_delta", "delta"]);

    WssiIndex {
        wssi_value,
        wssi_score: headline_number(raw, scope, &["wssi_score", "score"]),
        wssi_delta,
        trend: Trend::resolve(headline_string(raw, scope, &["trend"]).as_deref(), wssi_delta),
        stress_level: StressLevel::resolve(
            headline_string(raw, scope, &["stress_level"]).as_deref(),
            wssi_value,
        ),
        active_themes: pick_count(raw, &["active_themes"])
            .or_else(|| pick_count(scope, &["active_themes"])),
        above_warning: pick_count(raw, &["above_warning"])
            .or_else(|| pick_count(scope, &["above_warning"])),
        calculated_at: pick(raw, HEADLINE_TIMESTAMP)
            .or_else(|| pick(scope, HEADLINE_TIMESTAMP))
            .and_then(parse_timestamp),
        themes,
    }
}

fn headline_number(raw: &Value, scope: &Value, aliases: &[&str]) -> Option<f64> {
    pick_number(raw, aliases).or_else(|| pick_number(scope, aliases))
}

fn headline_string(raw: &Value, scope: &Value, aliases: &[&str]) -> Option<String> {
    pick_string(raw, aliases).or_else(|| pick_string(scope, aliases))
}

fn theme_rows(raw: &Value) -> &[Value] {
    if let Some(rows) = raw.as_array() {
        return rows;
    }
    if let Some(rows) = pick_array(raw, THEME_LIST) {
        return rows;
    }
    match raw.get("data") {
        Some(Value::Array(rows)) => rows,
        Some(data) => pick_array(data, THEME_LIST).unwrap_or(&[]),
        None => &[],
    }
}

fn theme_signal(row: &Value, now: DateTime<Utc>) -> Option<ThemeSignal> {
    if !row.is_object() {
        return None;
    }

    let name = pick_string(row, THEME_NAME);
    let theme_id = pick_string(row, THEME_ID).or_else(|| name.as_deref().map(slugify))?;
    let theme_name = name.unwrap_or_else(|| theme_id.clone());

    let stress_score = pick_number(row, THEME_Z);
    let momentum_30d = pick_number(row, THEME_MOMENTUM);
    let last_updated = pick(row, THEME_UPDATED).and_then(parse_timestamp);
    let age_hours = pick_number(row, THEME_AGE).or_else(|| last_updated.map(|t| age_hours(t, now)));

    Some(ThemeSignal {
        theme_id,
        theme_name,
        category: pick_string(row, THEME_CATEGORY).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        stress_score,
        stress_level: StressLevel::resolve(pick_string(row, THEME_LEVEL).as_deref(), stress_score),
        bar_ratio: bar_ratio(stress_score),
        trend: Trend::resolve(pick_string(row, THEME_TREND).as_deref(), momentum_30d),
        momentum_30d,
        weight: pick_number(row, &["weight"]),
        weighted_contribution: pick_number(row, &["weighted_contribution", "contribution"]),
        quality: pick_string(row, THEME_QUALITY)
            .map(|q| QualityTier::from_label(&q))
            .unwrap_or_default(),
        freshness: Freshness::resolve(pick_string(row, THEME_FRESHNESS).as_deref(), age_hours),
        age_hours,
        last_updated,
        indicators: pick_array(row, THEME_INDICATORS)
            .unwrap_or(&[])
            .iter()
            .filter_map(indicator_detail)
            .collect(),
    })
}

fn indicator_detail(row: &Value) -> Option<IndicatorDetail> {
    if !row.is_object() {
        return None;
    }
    let name = pick_string(row, INDICATOR_NAME);
    let indicator_id = pick_string(row, INDICATOR_ID).or_else(|| name.as_deref().map(slugify))?;

    Some(IndicatorDetail {
        indicator_name: name.unwrap_or_else(|| indicator_id.clone()),
        indicator_id,
        source: pick_string(row, &["source"]),
        raw_value: pick_number(row, &["raw_value", "value"]),
        normalized_z: pick_number(row, &["normalized_z", "z_score", "z"]),
        unit: pick_string(row, &["unit"]),
        date: pick_string(row, &["date", "timestamp"]),
    })
}
