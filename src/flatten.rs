//! Flattening of nested values into dotted keys
//!
//! [`flatten`] turns an arbitrarily nested [`Value`] into a single-level
//! mapping from dotted key to leaf value plus the label of the file it came
//! from. Mapping keys become path segments joined by `.`; sequence elements
//! contribute their index as a segment. The scheme is deliberately literal:
//! a scalar sequence element is recorded under its element prefix with the
//! trailing separator kept, so `{"a": [10, 20]}` flattens to `"a.0."` and
//! `"a.1."`.

use indexmap::IndexMap;

use crate::value::Value;

/// A leaf value paired with the label of the source it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedValue {
    /// The raw leaf value
    pub value: Value,
    /// Originating file path, or the literal `"override"`
    pub source: String,
}

impl SourcedValue {
    /// Create a new sourced value
    pub fn new(value: impl Into<Value>, source: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: source.into(),
        }
    }
}

/// Flatten a nested value into dotted keys
///
/// Pure function, independent of any manager. Input is assumed to be
/// tree-shaped, as produced by a deserializer; there is no cycle detection.
/// A top-level scalar has no key to live under and flattens to an empty map.
pub fn flatten(value: &Value, source: &str) -> IndexMap<String, SourcedValue> {
    let mut out = IndexMap::new();
    match value {
        Value::Mapping(_) | Value::Sequence(_) => flatten_into(value, source, "", &mut out),
        _ => {}
    }
    out
}

fn flatten_into(
    value: &Value,
    source: &str,
    prefix: &str,
    out: &mut IndexMap<String, SourcedValue>,
) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let new_key = format!("{}{}", prefix, key);
                match child {
                    Value::Mapping(_) | Value::Sequence(_) => {
                        flatten_into(child, source, &format!("{}.", new_key), out);
                    }
                    leaf => {
                        out.insert(new_key, SourcedValue::new(leaf.clone(), source));
                    }
                }
            }
        }
        Value::Sequence(seq) => {
            for (index, child) in seq.iter().enumerate() {
                // element prefix keeps the trailing separator
                let element_prefix = format!("{}{}.", prefix, index);
                match child {
                    Value::Mapping(_) | Value::Sequence(_) => {
                        flatten_into(child, source, &element_prefix, out);
                    }
                    leaf => {
                        out.insert(element_prefix, SourcedValue::new(leaf.clone(), source));
                    }
                }
            }
        }
        leaf => {
            out.insert(prefix.to_string(), SourcedValue::new(leaf.clone(), source));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    fn keys(flat: &IndexMap<String, SourcedValue>) -> Vec<&str> {
        flat.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_flat_input_is_unchanged() {
        let value = parse(r#"{"a": 1, "b": "two"}"#);
        let flat = flatten(&value, "src");

        assert_eq!(keys(&flat), vec!["a", "b"]);
        assert_eq!(flat["a"], SourcedValue::new(1i64, "src"));
        assert_eq!(flat["b"], SourcedValue::new("two", "src"));
    }

    #[test]
    fn test_nested_mappings() {
        let value = parse(r#"{"a": {"b": 1, "c": {"d": 2}}}"#);
        let flat = flatten(&value, "src");

        assert_eq!(keys(&flat), vec!["a.b", "a.c.d"]);
        assert_eq!(flat["a.b"], SourcedValue::new(1i64, "src"));
        assert_eq!(flat["a.c.d"], SourcedValue::new(2i64, "src"));
    }

    #[test]
    fn test_sequence_elements_keep_trailing_separator() {
        let value = parse(r#"{"a": [10, 20]}"#);
        let flat = flatten(&value, "src");

        assert_eq!(keys(&flat), vec!["a.0.", "a.1."]);
        assert_eq!(flat["a.0."], SourcedValue::new(10i64, "src"));
        assert_eq!(flat["a.1."], SourcedValue::new(20i64, "src"));
    }

    #[test]
    fn test_mappings_inside_sequences() {
        let value = parse(r#"{"servers": [{"host": "a"}, {"host": "b"}]}"#);
        let flat = flatten(&value, "src");

        assert_eq!(keys(&flat), vec!["servers.0.host", "servers.1.host"]);
        assert_eq!(flat["servers.1.host"], SourcedValue::new("b", "src"));
    }

    #[test]
    fn test_nested_sequences() {
        let value = parse(r#"{"m": [[1, 2], [3]]}"#);
        let flat = flatten(&value, "src");

        assert_eq!(keys(&flat), vec!["m.0.0.", "m.0.1.", "m.1.0."]);
        assert_eq!(flat["m.1.0."], SourcedValue::new(3i64, "src"));
    }

    #[test]
    fn test_top_level_sequence() {
        let value = parse(r#"[true, false]"#);
        let flat = flatten(&value, "src");

        assert_eq!(keys(&flat), vec!["0.", "1."]);
        assert_eq!(flat["0."], SourcedValue::new(true, "src"));
    }

    #[test]
    fn test_top_level_scalar_is_empty() {
        assert!(flatten(&Value::Integer(5), "src").is_empty());
        assert!(flatten(&Value::Null, "src").is_empty());
    }

    #[test]
    fn test_empty_collections_contribute_nothing() {
        let value = parse(r#"{"a": {}, "b": []}"#);
        assert!(flatten(&value, "src").is_empty());
    }

    #[test]
    fn test_source_label_is_recorded_per_leaf() {
        let value = parse(r#"{"a": {"b": null}}"#);
        let flat = flatten(&value, "/etc/app/config.json");

        assert_eq!(flat["a.b"].source, "/etc/app/config.json");
        assert_eq!(flat["a.b"].value, Value::Null);
    }
}
