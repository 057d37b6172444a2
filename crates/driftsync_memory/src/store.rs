//! In-memory store implementation.

use chrono::Utc;
use driftsync_core::timestamp;
use driftsync_core::{
    compare_values, Document, DocumentCursor, Filter, LuNormalizer, SortOrder, SortSpec, Store,
    StoreError, StoreResult, Timestamp, Value,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::cmp::Ordering;

/// Metadata for one declared index.
///
/// Only the leading field can serve an equality or range filter; compound
/// indexes report their first field as the leading one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// Engine-internal index name.
    pub name: String,
    /// Indexed fields, leading field first.
    pub fields: Vec<String>,
}

impl IndexSpec {
    fn from_fields(fields: &[&str]) -> Self {
        Self {
            name: format!("{}_idx", fields.join("_")),
            fields: fields.iter().map(|f| (*f).to_owned()).collect(),
        }
    }
}

/// An in-memory document store.
///
/// Documents live in an insertion-ordered map keyed by the canonical JSON
/// text of their key-field value, so `1` and `"1"` address different
/// records. All access is internally synchronized; the store is `Send +
/// Sync` and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use driftsync_core::Store;
/// use driftsync_memory::MemoryStore;
/// use serde_json::json;
///
/// let store = MemoryStore::new("tasks", "id", "updated_at")
///     .with_index(&["updated_at"]);
/// store.upsert(
///     vec![[("id", json!(1)), ("updated_at", json!(100))].into_iter().collect()],
///     "id",
///     false,
/// )?;
/// assert_eq!(store.len(), 1);
/// # Ok::<(), driftsync_core::StoreError>(())
/// ```
pub struct MemoryStore {
    name: String,
    key_field: String,
    lu_field: String,
    normalizer: LuNormalizer,
    read_only: bool,
    indexes: RwLock<Vec<IndexSpec>>,
    documents: RwLock<IndexMap<String, Document>>,
}

impl MemoryStore {
    /// Creates an empty store with the given name, key field, and
    /// last-updated field.
    ///
    /// Raw last-updated values are normalized with
    /// [`timestamp::normalize`] unless overridden via
    /// [`with_normalizer`](Self::with_normalizer). No indexes are
    /// declared; call [`with_index`](Self::with_index) or
    /// [`ensure_index`](Store::ensure_index).
    pub fn new(
        name: impl Into<String>,
        key_field: impl Into<String>,
        lu_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            key_field: key_field.into(),
            lu_field: lu_field.into(),
            normalizer: timestamp::normalize,
            read_only: false,
            indexes: RwLock::new(Vec::new()),
            documents: RwLock::new(IndexMap::new()),
        }
    }

    /// Declares an index, leading field first.
    pub fn with_index(mut self, fields: &[&str]) -> Self {
        self.indexes.get_mut().push(IndexSpec::from_fields(fields));
        self
    }

    /// Replaces the normalization strategy for raw last-updated values.
    pub fn with_normalizer(mut self, normalizer: LuNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Marks the store read-only.
    ///
    /// Upserts fail with [`StoreError::ReadOnly`] and
    /// [`ensure_index`](Store::ensure_index) becomes a silent no-op,
    /// modeling engines accessed without write or index-creation rights.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Seeds documents keyed by the store's own key field.
    ///
    /// Bypasses the read-only flag; intended for fixtures and for
    /// populating a source store out of band.
    pub fn seed(&self, documents: Vec<Document>) -> StoreResult<()> {
        self.write_batch(documents, &self.key_field, false)
    }

    /// Returns the document addressed by the given key value.
    pub fn get(&self, key: &Value) -> Option<Document> {
        self.documents.read().get(&key_repr(key)).cloned()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Snapshot of all stored documents in insertion order.
    pub fn documents(&self) -> Vec<Document> {
        self.documents.read().values().cloned().collect()
    }

    /// Declared indexes.
    pub fn indexes(&self) -> Vec<IndexSpec> {
        self.indexes.read().clone()
    }

    fn normalize_field(&self, field: &str, raw: &Value) -> StoreResult<Timestamp> {
        (self.normalizer)(raw)
            .map_err(|e| StoreError::normalize(&self.name, field, e.to_string()))
    }

    fn matches(&self, doc: &Document, filter: &Filter) -> StoreResult<bool> {
        match filter {
            Filter::All => Ok(true),
            Filter::NewerThan { field, after } => {
                let raw = doc
                    .get(field)
                    .ok_or_else(|| StoreError::missing_field(&self.name, field))?;
                Ok(self.normalize_field(field, raw)? > *after)
            }
        }
    }

    fn sort_documents(&self, docs: &mut Vec<Document>, spec: &SortSpec) -> StoreResult<()> {
        if spec.field == self.lu_field {
            // Raw lu values may mix representations; order by canonical form.
            let mut keyed = Vec::with_capacity(docs.len());
            for doc in docs.drain(..) {
                let raw = doc
                    .get(&spec.field)
                    .ok_or_else(|| StoreError::missing_field(&self.name, &spec.field))?;
                let ts = self.normalize_field(&spec.field, raw)?;
                keyed.push((ts, doc));
            }
            keyed.sort_by(|a, b| order(a.0.cmp(&b.0), spec.order));
            docs.extend(keyed.into_iter().map(|(_, doc)| doc));
        } else {
            docs.sort_by(|a, b| {
                let av = a.get(&spec.field).unwrap_or(&Value::Null);
                let bv = b.get(&spec.field).unwrap_or(&Value::Null);
                order(compare_values(av, bv), spec.order)
            });
        }
        Ok(())
    }

    fn write_batch(&self, documents: Vec<Document>, key: &str, stamp_lu: bool) -> StoreResult<()> {
        let stamp = stamp_lu.then(|| timestamp::to_value(Utc::now()));
        let mut store = self.documents.write();
        for mut doc in documents {
            if let Some(now) = &stamp {
                doc.insert(self.lu_field.clone(), now.clone());
            }
            let key_value = doc
                .get(key)
                .ok_or_else(|| StoreError::missing_field(&self.name, key))?;
            let repr = key_repr(key_value);
            store.insert(repr, doc);
        }
        Ok(())
    }
}

fn order(ord: Ordering, direction: SortOrder) -> Ordering {
    match direction {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    }
}

/// Canonical text of a key value. Distinguishes `1` from `"1"`.
fn key_repr(value: &Value) -> String {
    value.to_string()
}

impl Store for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn key_field(&self) -> &str {
        &self.key_field
    }

    fn lu_field(&self) -> &str {
        &self.lu_field
    }

    fn normalize_lu(&self, raw: &Value) -> StoreResult<Timestamp> {
        self.normalize_field(&self.lu_field, raw)
    }

    fn indexed_fields(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .indexes
            .read()
            .iter()
            .filter_map(|idx| idx.fields.first().cloned())
            .collect())
    }

    fn ensure_index(&self, field: &str) -> StoreResult<()> {
        if self.read_only {
            tracing::debug!(store = %self.name, field, "read-only store, index creation skipped");
            return Ok(());
        }
        let mut indexes = self.indexes.write();
        let present = indexes
            .iter()
            .any(|idx| idx.fields.first().map(String::as_str) == Some(field));
        if !present {
            indexes.push(IndexSpec::from_fields(&[field]));
            tracing::debug!(store = %self.name, field, "index created");
        }
        Ok(())
    }

    fn query(&self, filter: &Filter, sort: Option<&SortSpec>) -> StoreResult<DocumentCursor> {
        let snapshot: Vec<Document> = self.documents.read().values().cloned().collect();
        let mut matched = Vec::new();
        for doc in snapshot {
            if self.matches(&doc, filter)? {
                matched.push(doc);
            }
        }
        if let Some(spec) = sort {
            self.sort_documents(&mut matched, spec)?;
        }
        Ok(DocumentCursor::from_documents(matched))
    }

    fn upsert(&self, documents: Vec<Document>, key: &str, stamp_lu: bool) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::read_only(&self.name));
        }
        self.write_batch(documents, key, stamp_lu)
    }

    fn high_water_mark(&self) -> StoreResult<Option<Timestamp>> {
        let documents = self.documents.read();
        let mut mark: Option<Timestamp> = None;
        for doc in documents.values() {
            // Documents without the lu-field (pre-existing foreign rows)
            // do not contribute a mark.
            if let Some(raw) = doc.get(&self.lu_field) {
                let ts = self.normalize_field(&self.lu_field, raw)?;
                if mark.is_none_or(|m| ts > m) {
                    mark = Some(ts);
                }
            }
        }
        Ok(mark)
    }
}
