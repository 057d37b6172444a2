//! Schema-less document records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered mapping from field names to dynamically typed values.
///
/// Field names are not statically fixed; transform and load logic operates
/// generically over whatever fields a document carries. Insertion order is
/// preserved, including across in-place overwrites and removals.
///
/// A document is identified within a store by the value of that store's key
/// field, which must be unique in the store.
///
/// # Example
///
/// ```rust
/// use driftsync_core::Document;
/// use serde_json::json;
///
/// let mut doc = Document::new();
/// doc.insert("id", json!(7));
/// doc.insert("title", json!("sample"));
/// assert_eq!(doc.get("id"), Some(&json!(7)));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: IndexMap<String, Value>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Builds a document from a JSON value, which must be an object.
    ///
    /// Returns `None` for any other JSON kind.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map.into_iter().collect()),
            _ => None,
        }
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a field, overwriting any existing value in place.
    ///
    /// A field that already exists keeps its position; a new field is
    /// appended at the end.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    /// Removes a field, preserving the order of the remaining fields.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    /// Returns true if the document carries the named field.
    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields in the document.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.to_owned(), v)).collect(),
        }
    }
}

impl From<IndexMap<String, Value>> for Document {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }
}
