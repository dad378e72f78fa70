//! Response shape checking for the development-only validation mode.
//!
//! Deserialization with serde is lenient about unknown fields, which is
//! the right default for a forward-compatible client. When
//! `validate_responses` is on, the client additionally compares the raw
//! payload against the re-serialized DTO and reports any wire fields the
//! type silently dropped.

use serde_json::Value;

/// Dotted paths of fields present in `raw` but absent from `known`.
///
/// Arrays are compared element-wise against the shorter of the two; a
/// length mismatch is itself reported. Scalars always match: type-level
/// mismatches would already have failed deserialization.
pub fn unknown_fields(raw: &Value, known: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    walk(raw, known, String::new(), &mut paths);
    paths
}

fn walk(raw: &Value, known: &Value, path: String, out: &mut Vec<String>) {
    match (raw, known) {
        (Value::Object(raw_map), Value::Object(known_map)) => {
            for (key, raw_value) in raw_map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                match known_map.get(key) {
                    Some(known_value) => walk(raw_value, known_value, child, out),
                    None => out.push(child),
                }
            }
        }
        (Value::Array(raw_items), Value::Array(known_items)) => {
            if raw_items.len() != known_items.len() {
                out.push(format!("{path}[len {}!={}]", raw_items.len(), known_items.len()));
            }
            for (i, (r, k)) in raw_items.iter().zip(known_items.iter()).enumerate() {
                walk(r, k, format!("{path}[{i}]"), out);
            }
        }
        // Scalar vs anything: nothing to flag here.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_identical_shapes_have_no_drift() {
        let v = json!({"id": "t1", "hours": 8.0});
        assert!(unknown_fields(&v, &v).is_empty());
    }

    #[test]
    fn test_extra_top_level_field() {
        let raw = json!({"id": "t1", "audit_log": []});
        let known = json!({"id": "t1"});
        assert_eq!(unknown_fields(&raw, &known), vec!["audit_log"]);
    }

    #[test]
    fn test_nested_and_array_fields() {
        let raw = json!({
            "entries": [{"id": "e1", "billable": true}],
            "owner": {"id": "u1", "badge": "gold"}
        });
        let known = json!({
            "entries": [{"id": "e1"}],
            "owner": {"id": "u1"}
        });
        let mut drift = unknown_fields(&raw, &known);
        drift.sort();
        assert_eq!(drift, vec!["entries[0].billable", "owner.badge"]);
    }

    #[test]
    fn test_missing_known_field_is_not_drift() {
        // The DTO having more than the wire sent is an Option, not drift.
        let raw = json!({"id": "t1"});
        let known = json!({"id": "t1", "note": null});
        assert!(unknown_fields(&raw, &known).is_empty());
    }
}
