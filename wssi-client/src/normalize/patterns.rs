//! Historical analog (pattern match) normalization.

use std::cmp::Ordering;

use serde_json::Value;

use wssi_types::{PatternDiagnostics, PatternMatch, PatternSet, QualityTier};

use super::fields::{pick, pick_array, pick_number, pick_string, slugify, string_list, unwrap_data};
use super::time::parse_timestamp;

const MATCH_LISTS: &[&str] = &["matches", "patterns", "analogs"];

/// Normalize a pattern payload, best match first.
pub fn normalize_patterns(raw: &Value) -> PatternSet {
    let scope = unwrap_data(raw, MATCH_LISTS);
    let rows: &[Value] = match scope.as_array() {
        Some(rows) => rows,
        None => pick_array(scope, MATCH_LISTS).unwrap_or(&[]),
    };

    let mut matches: Vec<PatternMatch> = rows.iter().filter_map(pattern_match).collect();
    matches.sort_by(|a, b| {
        b.similarity_pct
            .partial_cmp(&a.similarity_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });

    PatternSet {
        matches,
        generated_at: pick(raw, &["generated_at", "timestamp"]).and_then(parse_timestamp),
    }
}

/// Similarity as a percentage in `[0, 100]`.
///
/// Fractions reported under `similarity`/`score` are scaled up; explicit
/// percentages are taken as-is.
fn similarity_pct(row: &Value) -> f64 {
    let pct = pick_number(row, &["similarity_pct", "similarity_percent"]).or_else(|| {
        pick_number(row, &["similarity", "score"]).map(|s| if s.abs() <= 1.0 { s * 100.0 } else { s })
    });
    pct.unwrap_or(0.0).clamp(0.0, 100.0)
}

fn list(obj: &Value, aliases: &[&str]) -> Vec<String> {
    pick(obj, aliases).map(string_list).unwrap_or_default()
}

fn pattern_match(row: &Value) -> Option<PatternMatch> {
    if !row.is_object() {
        return None;
    }
    let label = pick_string(row, &["label", "name", "episode"]);
    let episode_id = pick_string(row, &["episode_id", "id"]).or_else(|| label.as_deref().map(slugify))?;

    let diag = row.get("diagnostics").filter(|d| d.is_object()).unwrap_or(row);

    Some(PatternMatch {
        label: label.unwrap_or_else(|| episode_id.clone()),
        period: pick_string(row, &["period", "years", "date_range"]),
        similarity_pct: similarity_pct(row),
        confidence_tier: pick_string(row, &["confidence_tier", "confidence"])
            .map(|c| QualityTier::from_label(&c))
            .unwrap_or_default(),
        summary: pick_string(row, &["summary", "description", "narrative"]),
        diagnostics: PatternDiagnostics {
            raw_cosine: pick_number(diag, &["raw_cosine", "cosine"]),
            penalty: pick_number(diag, &["penalty", "coverage_penalty"]),
            overlap: list(diag, &["overlap", "overlapping_indicators"]),
            missing_indicators: list(diag, &["missing_indicators", "missing"]),
        },
        episode_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamped_and_sorted() {
        let raw = json!({"matches": [
            {"episode_id": "gfc", "label": "Global Financial Crisis", "similarity_pct": 72.5,
             "confidence_tier": "medium",
             "diagnostics": {"raw_cosine": 0.81, "penalty": "0.09",
                             "overlap": ["fao-food-price"], "missing_indicators": ["vix"]}},
            {"episode_id": "oil73", "label": "Oil Shock", "similarity_pct": 140},
            {"episode_id": "food08", "label": "Food Price Spike", "similarity_pct": 140},
            {"episode_id": "neg", "label": "Negative", "similarity_pct": -5, "confidence_tier": "certain"},
            {"label": "Dust Bowl", "similarity": 0.5}
        ]});
        let set = normalize_patterns(&raw);

        let order: Vec<&str> = set.matches.iter().map(|m| m.episode_id.as_str()).collect();
        assert_eq!(order, vec!["food08", "oil73", "gfc", "dust-bowl", "neg"]);
        assert_eq!(set.matches[0].similarity_pct, 100.0);
        assert_eq!(set.matches[3].similarity_pct, 50.0);
        assert_eq!(set.matches[4].similarity_pct, 0.0);
        assert_eq!(set.matches[4].confidence_tier, QualityTier::Unknown);

        let gfc = &set.matches[2];
        assert_eq!(gfc.confidence_tier, QualityTier::Medium);
        assert_eq!(gfc.diagnostics.raw_cosine, Some(0.81));
        assert_eq!(gfc.diagnostics.penalty, Some(0.09));
        assert_eq!(gfc.diagnostics.overlap, vec!["fao-food-price".to_string()]);
        assert_eq!(gfc.diagnostics.missing_indicators, vec!["vix".to_string()]);
        assert_eq!(set.top().unwrap().label, "Food Price Spike");
    }

    #[test]
    fn test_unusable_rows() {
        let set = normalize_patterns(&json!({"matches": [{}, null, {"similarity_pct": 50}]}));
        assert!(set.matches.is_empty());
        assert!(normalize_patterns(&json!("x")).matches.is_empty());
    }
}
