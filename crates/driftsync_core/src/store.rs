//! The abstract store capability trait.

use crate::cursor::DocumentCursor;
use crate::document::Document;
use crate::error::StoreResult;
use crate::filter::{Filter, SortSpec};
use crate::timestamp::Timestamp;
use serde_json::Value;

/// An abstract document collection.
///
/// One implementation exists per backing engine. The trait is object-safe;
/// sync logic consumes stores as `&dyn Store`.
///
/// # Capability contract
///
/// - A designated key field addresses documents; key values are unique
///   within the store.
/// - A designated last-updated field (lu-field) records when a document
///   last changed, in whatever raw form the engine produces;
///   [`normalize_lu`](Store::normalize_lu) converts raw values to the
///   canonical [`Timestamp`].
/// - Index metadata is reported as the leading fields of existing indexes.
///   [`ensure_index`](Store::ensure_index) is best-effort: an engine
///   without index-creation rights may silently do nothing.
/// - Queries return a counted, ordered, single-pass [`DocumentCursor`].
/// - [`upsert`](Store::upsert) writes a batch keyed by a caller-chosen
///   field; `stamp_lu` controls whether the engine overwrites each
///   document's lu-field with the write wall-clock time.
pub trait Store: Send + Sync {
    /// Name of this store, used in error messages and diagnostics.
    fn name(&self) -> &str;

    /// Name of the field addressing documents in this store.
    fn key_field(&self) -> &str;

    /// Name of the last-updated field.
    fn lu_field(&self) -> &str;

    /// Converts a raw last-updated value into canonical form.
    fn normalize_lu(&self, raw: &Value) -> StoreResult<Timestamp>;

    /// Leading fields of the store's existing indexes.
    fn indexed_fields(&self) -> StoreResult<Vec<String>>;

    /// Best-effort single-field index creation.
    ///
    /// May be a no-op when the engine does not support index creation or
    /// the store is read-only.
    fn ensure_index(&self, field: &str) -> StoreResult<()>;

    /// Runs a filtered, optionally sorted query.
    fn query(&self, filter: &Filter, sort: Option<&SortSpec>) -> StoreResult<DocumentCursor>;

    /// Writes a batch of documents keyed by `key`.
    ///
    /// With `stamp_lu` set, the engine overwrites each written document's
    /// lu-field with the current wall-clock time; unset, lu-field values
    /// in the batch are written through untouched.
    fn upsert(&self, documents: Vec<Document>, key: &str, stamp_lu: bool) -> StoreResult<()>;

    /// The most recent normalized lu-field value in this store, if any.
    ///
    /// Default implementation issues a descending-lu query and normalizes
    /// the first row. Engines whose lu-sort rejects documents without the
    /// lu-field should override this to skip such documents.
    fn high_water_mark(&self) -> StoreResult<Option<Timestamp>> {
        let sort = SortSpec::descending(self.lu_field());
        let mut cursor = self.query(&Filter::All, Some(&sort))?;
        match cursor.next() {
            Some(first) => {
                let doc = first?;
                match doc.get(self.lu_field()) {
                    Some(raw) => Ok(Some(self.normalize_lu(raw)?)),
                    None => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    /// Builds the change-detection filter for syncing this store into
    /// `target`.
    ///
    /// Selects documents whose lu-field is strictly newer than the
    /// target's recorded high-water mark; a target with no mark selects
    /// all documents.
    fn sync_filter(&self, target: &dyn Store) -> StoreResult<Filter> {
        Ok(match target.high_water_mark()? {
            Some(mark) => Filter::newer_than(self.lu_field(), mark),
            None => Filter::All,
        })
    }
}
