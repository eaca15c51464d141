// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Group-list normalization.
//!
//! Identity providers and domain metadata express group membership in
//! several shapes: JSON arrays, comma-separated strings, space-separated
//! strings, or already-decoded arrays of mixed scalars. Everything here maps
//! those shapes onto one ordered list of non-empty, trimmed group names.
//!
//! Normalization never fails and never de-duplicates.

use serde_json::{Number, Value};

/// Split a raw string on runs of commas and/or whitespace.
pub fn split_group_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a group list stored as a string.
///
/// A JSON array is tried first; each element is then split again, so
/// `["a","b c"]` yields `a`, `b`, `c`. Anything that is not a JSON array
/// falls back to delimiter splitting of the raw text. An absent or empty
/// value yields no groups.
pub fn parse_group_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => flatten_items(&items),
        _ => split_group_list(raw),
    }
}

/// Normalize a decoded group claim.
///
/// Strings go through [`parse_group_list`]; arrays have each element
/// stringified and split. Any other shape carries no groups.
pub fn normalize_group_claim(value: &Value) -> Vec<String> {
    match value {
        Value::String(raw) => parse_group_list(Some(raw)),
        Value::Array(items) => flatten_items(items),
        _ => Vec::new(),
    }
}

fn flatten_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| match item {
            Value::String(s) => split_group_list(s),
            Value::Number(n) => split_group_list(&number_to_group(n)),
            Value::Bool(b) => vec![b.to_string()],
            Value::Array(nested) => flatten_items(nested),
            // No meaningful group name
            Value::Null | Value::Object(_) => Vec::new(),
        })
        .collect()
}

/// Integral floats print without a fractional part (`1.0` -> `1`).
fn number_to_group(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_on_commas_and_spaces() {
        assert_eq!(split_group_list("readers, auditors"), vec!["readers", "auditors"]);
        assert_eq!(split_group_list("readers auditors"), vec!["readers", "auditors"]);
        assert_eq!(split_group_list(" ,a,,\tb\n c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn parses_json_arrays_with_nested_splitting() {
        assert_eq!(parse_group_list(Some(r#"["a","b c"]"#)), vec!["a", "b", "c"]);
        assert_eq!(parse_group_list(Some(r#"["reader"]"#)), vec!["reader"]);
    }

    #[test]
    fn falls_back_to_splitting_non_array_json() {
        assert_eq!(parse_group_list(Some(r#""quoted""#)), vec![r#""quoted""#]);
        assert_eq!(parse_group_list(Some("[not json")), vec!["[not", "json"]);
        assert_eq!(parse_group_list(Some("reader viewer")), vec!["reader", "viewer"]);
    }

    #[test]
    fn empty_inputs_yield_no_groups() {
        assert!(parse_group_list(None).is_empty());
        assert!(parse_group_list(Some("")).is_empty());
        assert!(parse_group_list(Some("  , ")).is_empty());
        assert!(parse_group_list(Some("[]")).is_empty());
    }

    #[test]
    fn integral_floats_print_as_integers() {
        assert_eq!(parse_group_list(Some("[1.0, 2, -3.0]")), vec!["1", "2", "-3"]);
        assert_eq!(parse_group_list(Some("[0.25]")), vec!["0.25"]);
    }

    #[test]
    fn preserves_duplicates_and_order() {
        assert_eq!(split_group_list("b a b"), vec!["b", "a", "b"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = parse_group_list(Some(r#"["ops, dev", "qa"]"#));
        let again = split_group_list(&once.join(" "));
        assert_eq!(once, again);
        let as_claim = normalize_group_claim(&json!(once));
        assert_eq!(once, as_claim);
    }

    #[test]
    fn normalizes_claim_shapes() {
        assert_eq!(normalize_group_claim(&json!("readers, auditors")), vec!["readers", "auditors"]);
        assert_eq!(normalize_group_claim(&json!(["worker", 42, true])), vec!["worker", "42", "true"]);
        assert_eq!(normalize_group_claim(&json!(["a b", ["c"]])), vec!["a", "b", "c"]);
        assert!(normalize_group_claim(&json!(null)).is_empty());
        assert_eq!(normalize_group_claim(&json!([7.0, 2.5])), vec!["7", "2.5"]);
        assert!(normalize_group_claim(&json!(7)).is_empty());
        assert!(normalize_group_claim(&json!({"groups": ["x"]})).is_empty());
    }
}
