//! Field value types

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name as reported by the host
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// MIME type (e.g. `image/png`)
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl FileEntry {
    /// Create a new file entry
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// Ordered collection of uploaded files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileList {
    files: Vec<FileEntry>,
}

impl FileList {
    /// Create an empty file list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file
    pub fn push(&mut self, file: FileEntry) -> &mut Self {
        self.files.push(file);
        self
    }

    /// Number of files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if no file is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Get a file by index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.files.get(index)
    }

    /// Iterate in index order
    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.files.iter()
    }
}

impl From<Vec<FileEntry>> for FileList {
    fn from(files: Vec<FileEntry>) -> Self {
        Self { files }
    }
}

impl FromIterator<FileEntry> for FileList {
    fn from_iter<I: IntoIterator<Item = FileEntry>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileList {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Values a form field can hold
#[derive(Debug, Clone, Default)]
pub enum FieldValue {
    /// No value at all (missing field)
    #[default]
    Undefined,

    /// Explicitly empty value
    Null,

    /// Boolean value
    Bool(bool),

    /// Numeric value; NaN and infinities are representable
    Number(f64),

    /// Text value
    String(String),

    /// Point in time
    Date(DateTime<Utc>),

    /// List of values (multi-select, checkbox group)
    Array(Vec<FieldValue>),

    /// Nested object
    Object(BTreeMap<String, FieldValue>),

    /// Uploaded files
    Files(FileList),

    /// Compiled regular expression
    Regex(Regex),
}

impl FieldValue {
    /// Short name of the value shape, for diagnostics
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Undefined => "undefined",
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::String(_) => "string",
            FieldValue::Date(_) => "date",
            FieldValue::Array(_) => "array",
            FieldValue::Object(_) => "object",
            FieldValue::Files(_) => "files",
            FieldValue::Regex(_) => "regexp",
        }
    }

    /// Borrow as text
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value, if this is a number
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as a list
    #[must_use]
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as an object
    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            FieldValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as a file list
    #[must_use]
    pub fn as_files(&self) -> Option<&FileList> {
        match self {
            FieldValue::Files(files) => Some(files),
            _ => None,
        }
    }

    /// Look up one path segment (object key or list index)
    #[must_use]
    pub fn get(&self, segment: &str) -> Option<&FieldValue> {
        match self {
            FieldValue::Object(map) => map.get(segment),
            FieldValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Undefined, FieldValue::Undefined) | (FieldValue::Null, FieldValue::Null) => {
                true
            }
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            // NaN is equal to itself here, like structural equality in form state
            (FieldValue::Number(a), FieldValue::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Date(a), FieldValue::Date(b)) => {
                a.timestamp_millis() == b.timestamp_millis()
            }
            (FieldValue::Array(a), FieldValue::Array(b)) => a == b,
            (FieldValue::Object(a), FieldValue::Object(b)) => a == b,
            (FieldValue::Files(a), FieldValue::Files(b)) => a == b,
            (FieldValue::Regex(a), FieldValue::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<u64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: u64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<usize> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: usize) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

impl From<FileList> for FieldValue {
    fn from(value: FileList) -> Self {
        FieldValue::Files(value)
    }
}

impl From<Regex> for FieldValue {
    fn from(value: Regex) -> Self {
        FieldValue::Regex(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl From<&serde_json::Value> for FieldValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => FieldValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                FieldValue::Array(items.iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(map) => FieldValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::from(&value)
    }
}
