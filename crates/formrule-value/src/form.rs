//! Form values snapshot

use crate::value::FieldValue;
use std::collections::BTreeMap;

/// The values of every field in a form, keyed by field name
///
/// Nested values are reached with dotted or bracket paths, e.g.
/// `address.city`, `items.0` or `items[0].sku`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    fields: BTreeMap<String, FieldValue>,
}

impl FormValues {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a top-level field, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a top-level field by exact name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Look up a field by path
    ///
    /// The path is split on `.`, `[`, `]` and `,`. When walking the segments
    /// finds nothing, the whole path is tried as a literal top-level key.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path
            .split(['.', '[', ']', ','])
            .filter(|segment| !segment.is_empty());

        let walked = segments.next().and_then(|first| {
            segments.try_fold(self.fields.get(first)?, |current, segment| {
                current.get(segment)
            })
        });

        walked.or_else(|| self.fields.get(path))
    }

    /// Resolve a path to an owned value; missing paths become `Undefined`
    #[must_use]
    pub fn resolve(&self, path: &str) -> FieldValue {
        self.lookup(path).cloned().unwrap_or_default()
    }

    /// Number of top-level fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the snapshot holds no field
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over top-level fields in name order
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Non-object JSON input yields an empty snapshot.
impl From<serde_json::Value> for FormValues {
    fn from(value: serde_json::Value) -> Self {
        match FieldValue::from(value) {
            FieldValue::Object(fields) => Self { fields },
            other => {
                tracing::debug!(
                    "Ignoring {} form values, expected an object",
                    other.type_name()
                );
                Self::default()
            }
        }
    }
}

impl From<BTreeMap<String, FieldValue>> for FormValues {
    fn from(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> FormValues {
        FormValues::from(json!({
            "field": "value",
            "field2": 1,
            "object": { "value": true },
            "array": [1],
            "rows": [{ "sku": "A-1" }],
            "dotted.key": "literal"
        }))
    }

    #[test]
    fn test_top_level_lookup() {
        let form = sample();
        assert_eq!(form.resolve("field"), FieldValue::from("value"));
        assert_eq!(form.resolve("field2"), FieldValue::from(1));
    }

    #[test]
    fn test_nested_lookup() {
        let form = sample();
        assert_eq!(form.resolve("object.value"), FieldValue::Bool(true));
        assert_eq!(form.resolve("array.0"), FieldValue::from(1));
        assert_eq!(form.resolve("rows[0].sku"), FieldValue::from("A-1"));
        assert_eq!(form.resolve("object"), FieldValue::from(json!({"value": true})));
    }

    #[test]
    fn test_missing_paths_are_undefined() {
        let form = sample();
        assert_eq!(form.resolve("array.1"), FieldValue::Undefined);
        assert_eq!(form.resolve("nope"), FieldValue::Undefined);
        assert_eq!(form.resolve("field.deeper"), FieldValue::Undefined);
        assert_eq!(form.resolve(""), FieldValue::Undefined);
    }

    #[test]
    fn test_literal_key_fallback() {
        let form = sample();
        assert_eq!(form.resolve("dotted.key"), FieldValue::from("literal"));
    }

    #[test]
    fn test_non_object_json_is_empty() {
        assert!(FormValues::from(json!([1, 2])).is_empty());
    }

    #[test]
    fn test_builder_and_iter() {
        let form = FormValues::new().with("b", 2).with("a", "x");
        let names: Vec<&String> = form.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(form.len(), 2);

        let collected: FormValues = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(collected.get("b"), Some(&FieldValue::from(2)));
    }
}
