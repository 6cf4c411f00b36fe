//! Correlation matrix normalization.
//!
//! Upstream data may carry a dense matrix, a list of pairs, or both. The
//! output is always the complete square matrix over the union of theme ids
//! found in either source, self-pairs included.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use wssi_types::{
    CorrelationCell, CorrelationMatrix, MatrixTheme, ThemeCatalog, SIGNIFICANCE_P_VALUE,
};

use super::fields::{
    number, pick, pick_array, pick_bool, pick_count, pick_number, pick_string, string,
};
use super::index::DEFAULT_CATEGORY;
use super::time::parse_timestamp;

const PAIR_A: &[&str] = &["theme_a", "source", "a", "theme1"];
const PAIR_B: &[&str] = &["theme_b", "target", "b", "theme2"];
const PAIR_R: &[&str] = &["pearson_r", "r", "correlation", "pearson"];
const PAIR_P: &[&str] = &["p_value", "p", "pvalue"];
const PAIR_N: &[&str] = &["sample_n", "n", "sample_size"];
const AXIS_THEMES: &[&str] = &["themes", "theme_ids", "labels"];

#[derive(Debug, Default)]
struct PairStats {
    pearson_r: Option<f64>,
    p_value: Option<f64>,
    sample_n: Option<u32>,
    significant: Option<bool>,
}

/// Normalize a correlations payload.
///
/// `default_threshold` applies when the payload carries no usable
/// `strong_threshold` of its own.
pub fn normalize_correlations(
    raw: &Value,
    catalog: &ThemeCatalog,
    default_threshold: f64,
) -> CorrelationMatrix {
    let scope = correlation_scope(raw);

    let strong_threshold = pick_number(scope, &["strong_threshold", "threshold"])
        .or_else(|| pick_number(raw, &["strong_threshold"]))
        .filter(|t| *t > 0.0 && *t <= 1.0)
        .unwrap_or(default_threshold);

    let axis_meta = axis_metadata(scope);
    let mut universe: BTreeSet<String> = BTreeSet::new();

    let matrix = matrix_values(scope, &mut universe);
    let pairs = pair_values(scope, &mut universe);

    let mut themes: Vec<MatrixTheme> = universe
        .into_iter()
        .map(|id| {
            let (name, category) = match axis_meta.iter().find(|m| m.theme_id == id) {
                Some(m) => (m.theme_name.clone(), m.category.clone()),
                None => match catalog.get(&id) {
                    Some(meta) => (meta.name.clone(), meta.category.clone()),
                    None => (id.clone(), DEFAULT_CATEGORY.to_string()),
                },
            };
            MatrixTheme {
                theme_id: id,
                theme_name: name,
                category,
            }
        })
        .collect();
    themes.sort_by(|a, b| {
        a.theme_name
            .to_lowercase()
            .cmp(&b.theme_name.to_lowercase())
            .then_with(|| a.theme_id.cmp(&b.theme_id))
    });

    let mut cells = Vec::with_capacity(themes.len() * themes.len());
    for a in &themes {
        for b in &themes {
            cells.push(build_cell(&a.theme_id, &b.theme_id, &matrix, &pairs, strong_threshold));
        }
    }

    CorrelationMatrix {
        themes,
        cells,
        strong_threshold,
        generated_at: pick(raw, &["generated_at", "timestamp"]).and_then(parse_timestamp),
    }
}

fn correlation_scope(raw: &Value) -> &Value {
    let has_data = |v: &Value| v.get("matrix").is_some() || v.get("pairs").is_some();
    for key in ["theme_level", "data"] {
        if let Some(inner) = raw.get(key) {
            if has_data(inner) {
                return inner;
            }
        }
    }
    raw
}

fn axis_metadata(scope: &Value) -> Vec<MatrixTheme> {
    // Bare id lists carry no metadata; only object entries contribute here
    pick_array(scope, AXIS_THEMES)
        .unwrap_or(&[])
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| {
            let id = pick_string(item, &["theme_id", "id"])?;
            Some(MatrixTheme {
                theme_name: pick_string(item, &["theme_name", "name", "label"])
                    .unwrap_or_else(|| id.clone()),
                category: pick_string(item, &["category"])
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                theme_id: id,
            })
        })
        .collect()
}

fn axis_ids(scope: &Value) -> Vec<String> {
    pick_array(scope, AXIS_THEMES)
        .unwrap_or(&[])
        .iter()
        .map(|item| {
            if item.is_object() {
                pick_string(item, &["theme_id", "id"]).unwrap_or_default()
            } else {
                string(item).unwrap_or_default()
            }
        })
        .collect()
}

fn matrix_values(
    scope: &Value,
    universe: &mut BTreeSet<String>,
) -> HashMap<(String, String), f64> {
    let mut values = HashMap::new();

    match scope.get("matrix") {
        // Map of maps: matrix[a][b] = r
        Some(Value::Object(rows)) => {
            for (a, row) in rows {
                if a.trim().is_empty() {
                    continue;
                }
                universe.insert(a.clone());
                if let Some(row) = row.as_object() {
                    for (b, value) in row {
                        if b.trim().is_empty() {
                            continue;
                        }
                        universe.insert(b.clone());
                        if let Some(r) = number(value) {
                            values.insert((a.clone(), b.clone()), r);
                        }
                    }
                }
            }
        }
        // Dense rows aligned with an axis id list
        Some(Value::Array(rows)) => {
            let ids = axis_ids(scope);
            for (i, row) in rows.iter().enumerate() {
                let Some(a) = ids.get(i).filter(|id| !id.is_empty()) else {
                    continue;
                };
                universe.insert(a.clone());
                let cols = row.as_array().map(Vec::as_slice).unwrap_or(&[]);
                for (j, value) in cols.iter().enumerate() {
                    let Some(b) = ids.get(j).filter(|id| !id.is_empty()) else {
                        continue;
                    };
                    universe.insert(b.clone());
                    if let Some(r) = number(value) {
                        values.insert((a.clone(), b.clone()), r);
                    }
                }
            }
        }
        _ => {}
    }

    values
}

fn pair_values(
    scope: &Value,
    universe: &mut BTreeSet<String>,
) -> HashMap<(String, String), PairStats> {
    let mut pairs = HashMap::new();

    for row in pick_array(scope, &["pairs"]).unwrap_or(&[]) {
        let (Some(a), Some(b)) = (pick_string(row, PAIR_A), pick_string(row, PAIR_B)) else {
            continue;
        };
        universe.insert(a.clone());
        universe.insert(b.clone());
        pairs.entry((a, b)).or_insert_with(|| PairStats {
            pearson_r: pick_number(row, PAIR_R),
            p_value: pick_number(row, PAIR_P),
            sample_n: pick_count(row, PAIR_N),
            significant: pick_bool(row, &["significant", "is_significant"]),
        });
    }

    pairs
}

fn lookup<'a, T>(map: &'a HashMap<(String, String), T>, a: &str, b: &str) -> Option<&'a T> {
    map.get(&(a.to_string(), b.to_string()))
        .or_else(|| map.get(&(b.to_string(), a.to_string())))
}

fn build_cell(
    a: &str,
    b: &str,
    matrix: &HashMap<(String, String), f64>,
    pairs: &HashMap<(String, String), PairStats>,
    strong_threshold: f64,
) -> CorrelationCell {
    let is_self = a == b;
    let pair = if is_self { None } else { lookup(pairs, a, b) };

    let pearson_r = if is_self {
        Some(1.0)
    } else {
        lookup(matrix, a, b)
            .copied()
            .or_else(|| pair.and_then(|p| p.pearson_r))
    };

    let p_value = pair.and_then(|p| p.p_value);
    let is_significant = !is_self
        && pair
            .and_then(|p| p.significant)
            .unwrap_or_else(|| p_value.is_some_and(|p| p < SIGNIFICANCE_P_VALUE));
    let is_strong = !is_self && pearson_r.is_some_and(|r| r.abs() >= strong_threshold);

    CorrelationCell {
        theme_a: a.to_string(),
        theme_b: b.to_string(),
        pearson_r,
        p_value,
        sample_n: pair.and_then(|p| p.sample_n),
        is_self,
        is_significant,
        is_strong,
        pattern_label: CorrelationCell::label_for(pearson_r, is_self, is_strong).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wssi_types::{ThemeMeta, DEFAULT_STRONG_THRESHOLD};

    #[test]
    fn test_pairs_only_uses_default_threshold() {
        let raw = json!({"pairs": [{"theme_a": "A", "theme_b": "B", "pearson_r": 0.7}]});
        let matrix = normalize_correlations(&raw, &ThemeCatalog::default(), DEFAULT_STRONG_THRESHOLD);

        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.cells.len(), 4);
        let cell = matrix.pair("A", "B").unwrap();
        assert!(cell.is_strong);
        assert_eq!(cell.pattern_label, "Emerging Pattern");
        // Reverse ordering resolves from the same pair
        assert_eq!(matrix.pair("B", "A").unwrap().pearson_r, Some(0.7));
    }

    #[test]
    fn test_self_pairs_and_square_shape() {
        let raw = json!({
            "generated_at": "2026-03-01T00:00:00Z",
            "theme_level": {
                "strong_threshold": 0.5,
                "matrix": {
                    "food": {"energy": 0.55, "food": 0.98},
                    "energy": {"water": null}
                },
                "pairs": [
                    {"theme_a": "water", "theme_b": "food", "pearson_r": -0.8, "p_value": 0.01, "sample_n": 120},
                    {"theme_a": "energy", "theme_b": "food", "pearson_r": 0.1}
                ]
            }
        });
        let matrix = normalize_correlations(&raw, &ThemeCatalog::default(), DEFAULT_STRONG_THRESHOLD);

        let n = matrix.size();
        assert_eq!(n, 3);
        assert_eq!(matrix.cells.len(), n * n);
        assert_eq!(matrix.strong_threshold, 0.5);
        assert!(matrix.generated_at.is_some());
        for i in 0..n {
            let cell = matrix.cell(i, i).unwrap();
            assert!(cell.is_self);
            assert_eq!(cell.pearson_r, Some(1.0));
            assert!(!cell.is_strong);
        }

        // Matrix entry wins over the pairs list
        let fe = matrix.pair("food", "energy").unwrap();
        assert_eq!(fe.pearson_r, Some(0.55));
        assert!(fe.is_strong);

        let wf = matrix.pair("food", "water").unwrap();
        assert_eq!(wf.pearson_r, Some(-0.8));
        assert_eq!(wf.pattern_label, "Inverse Pattern");
        assert!(wf.is_significant);
        assert_eq!(wf.sample_n, Some(120));

        let ew = matrix.pair("energy", "water").unwrap();
        assert_eq!(ew.pearson_r, None);
        assert_eq!(ew.pattern_label, "Insufficient Data");
    }

    #[test]
    fn test_axis_sorted_by_display_name() {
        let mut catalog = ThemeCatalog::default();
        catalog.insert(
            "t1".to_string(),
            ThemeMeta { name: "Zoonotic Spillover".to_string(), category: "Health".to_string() },
        );
        catalog.insert(
            "t2".to_string(),
            ThemeMeta { name: "Agriculture".to_string(), category: "Food".to_string() },
        );
        let raw = json!({"pairs": [{"theme_a": "t1", "theme_b": "t2", "pearson_r": 0.2}]});
        let matrix = normalize_correlations(&raw, &catalog, DEFAULT_STRONG_THRESHOLD);

        let names: Vec<&str> = matrix.themes.iter().map(|t| t.theme_name.as_str()).collect();
        assert_eq!(names, vec!["Agriculture", "Zoonotic Spillover"]);
        assert_eq!(matrix.themes[0].category, "Food");
    }

    #[test]
    fn test_dense_matrix_with_axis() {
        let raw = json!({
            "themes": [{"theme_id": "b", "theme_name": "Beta"}, {"theme_id": "a", "theme_name": "Alpha"}],
            "matrix": [[1.0, "0.65"], [0.65, 1.0]]
        });
        let matrix = normalize_correlations(&raw, &ThemeCatalog::default(), DEFAULT_STRONG_THRESHOLD);

        assert_eq!(matrix.themes[0].theme_id, "a");
        assert_eq!(matrix.pair("a", "b").unwrap().pearson_r, Some(0.65));
        assert!(matrix.pair("a", "b").unwrap().is_strong);
    }

    #[test]
    fn test_empty_payload() {
        let matrix = normalize_correlations(&json!({}), &ThemeCatalog::default(), DEFAULT_STRONG_THRESHOLD);
        assert_eq!(matrix.size(), 0);
        assert!(matrix.cells.is_empty());

        let catalog = ThemeCatalog::default();
        let run = |raw: serde_json::Value| normalize_correlations(&raw, &catalog, DEFAULT_STRONG_THRESHOLD);

        assert_eq!(run(json!({"matrix": "x"})).size(), 0);
        assert_eq!(run(json!(null)).size(), 0);
        assert_eq!(run(json!({"pairs": [5, "a", null, {"theme_a": "a"}]})).size(), 0);

        // Ragged dense rows: short rows, a non-array row and a row past the axis
        let ragged = run(json!({
            "themes": ["a", "b", "c"],
            "matrix": [[1.0, 0.5], [0.5], "row", [0.1, 0.2, 0.3, 0.4]]
        }));
        assert_eq!(ragged.size(), 3);
        assert_eq!(ragged.cells.len(), 9);
        assert_eq!(ragged.pair("a", "b").unwrap().pearson_r, Some(0.5));
        assert_eq!(ragged.pair("a", "c").unwrap().pearson_r, None);
        assert_eq!(ragged.pair("c", "c").unwrap().pearson_r, Some(1.0));

        // Blank keys never become themes
        let blank = run(json!({"matrix": {"": {"a": 0.3}, "b": {"": 0.2, "c": 0.4}}}));
        let ids: Vec<&str> = blank.themes.iter().map(|t| t.theme_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(blank.pair("b", "c").unwrap().pearson_r, Some(0.4));
    }
}
