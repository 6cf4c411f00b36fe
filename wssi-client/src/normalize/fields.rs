//! Field alias lookup and coercion guards.
//!
//! Upstream payloads spell the same field several ways depending on which
//! backend release (or static artifact generator) produced them. Every
//! normalizer reads through these helpers with an explicit alias table, so a
//! missing or malformed field turns into `None` instead of an error.

use serde_json::Value;

/// Parse a JSON value as a finite number.
///
/// Numbers and numeric strings are accepted; `null`, booleans, non-finite
/// values and anything else yield `None`.
pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Read a JSON value as a non-empty string. Numbers are rendered.
pub fn string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First alias present on the object with a non-null value.
pub fn pick<'a>(obj: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| obj.get(key))
        .find(|v| !v.is_null())
}

/// First alias that coerces to a finite number.
pub fn pick_number(obj: &Value, aliases: &[&str]) -> Option<f64> {
    aliases.iter().filter_map(|key| obj.get(key)).find_map(number)
}

/// First alias that reads as a non-empty string.
pub fn pick_string(obj: &Value, aliases: &[&str]) -> Option<String> {
    aliases.iter().filter_map(|key| obj.get(key)).find_map(string)
}

/// First alias holding an array.
pub fn pick_array<'a>(obj: &'a Value, aliases: &[&str]) -> Option<&'a [Value]> {
    aliases
        .iter()
        .filter_map(|key| obj.get(key))
        .find_map(|v| v.as_array().map(Vec::as_slice))
}

/// First alias holding a boolean.
pub fn pick_bool(obj: &Value, aliases: &[&str]) -> Option<bool> {
    aliases
        .iter()
        .filter_map(|key| obj.get(key))
        .find_map(Value::as_bool)
}

/// First alias holding a non-negative count.
pub fn pick_count(obj: &Value, aliases: &[&str]) -> Option<u32> {
    pick_number(obj, aliases)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round().min(u32::MAX as f64) as u32)
}

/// Strings from an array (or a single string), skipping anything unusable.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(string).collect(),
        other => string(other).into_iter().collect(),
    }
}

/// Lower-case slug: spaces and slashes become dashes.
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '/'], "-")
}

/// The object itself, or its `data` member when the payload is wrapped.
pub fn unwrap_data<'a>(raw: &'a Value, probe: &[&str]) -> &'a Value {
    if probe.iter().any(|key| raw.get(key).is_some()) {
        return raw;
    }
    match raw.get("data") {
        Some(data) if data.is_object() || data.is_array() => data,
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_guard() {
        assert_eq!(number(&json!(2.5)), Some(2.5));
        assert_eq!(number(&json!(" 1.25 ")), Some(1.25));
        assert_eq!(number(&json!("-3")), Some(-3.0));
        assert_eq!(number(&json!(null)), None);
        assert_eq!(number(&json!("abc")), None);
        assert_eq!(number(&json!("NaN")), None);
        assert_eq!(number(&json!("inf")), None);
        assert_eq!(number(&json!(true)), None);
        assert_eq!(number(&json!({"v": 1})), None);
        assert_eq!(number(&json!("")), None);
    }

    #[test]
    fn test_pick_skips_null_and_bad_values() {
        let obj = json!({"a": null, "b": "oops", "c": "4"});
        assert_eq!(pick(&obj, &["a", "b"]), Some(&json!("oops")));
        assert_eq!(pick_number(&obj, &["a", "b", "c"]), Some(4.0));
        assert_eq!(pick_string(&obj, &["a", "c"]), Some("4".to_string()));
        assert_eq!(pick_count(&json!({"n": -2}), &["n"]), None);
        assert_eq!(pick_count(&json!({"n": "7"}), &["n"]), Some(7));
    }

    #[test]
    fn test_string_list() {
        assert_eq!(
            string_list(&json!(["a", "", 3, null, "b"])),
            vec!["a".to_string(), "3".to_string(), "b".to_string()]
        );
        assert_eq!(string_list(&json!("solo")), vec!["solo".to_string()]);
        assert!(string_list(&json!(null)).is_empty());
    }

    #[test]
    fn test_slugify_matches_backend_theme_ids() {
        assert_eq!(slugify("Food System"), "food-system");
        assert_eq!(slugify("Energy/Climate Shock"), "energy-climate-shock");
    }

    #[test]
    fn test_unwrap_data() {
        let wrapped = json!({"data": {"themes": []}});
        assert!(unwrap_data(&wrapped, &["themes"]).get("themes").is_some());
        let flat = json!({"themes": []});
        assert!(unwrap_data(&flat, &["themes"]).get("themes").is_some());
    }
}
