//! The load phase: last-updated normalization and keyed upsert.

use crate::error::SyncResult;
use driftsync_core::{timestamp, Document, Store, StoreError};
use tracing::debug;

/// Loads a transformed batch into the target.
///
/// For each document the source's raw last-updated value is normalized
/// through the source's designated strategy and written into the
/// target's last-updated attribute; when the two field names differ, the
/// source-named attribute is removed. The batch is then upserted keyed by
/// `key` with the target's autonomous last-updated stamping disabled —
/// the written value must reflect the source's true update time, or
/// future runs would filter against a corrupted high-water mark.
///
/// A document lacking the source's last-updated field fails the run with
/// [`StoreError::MissingField`].
pub(crate) fn load(
    source: &dyn Store,
    target: &dyn Store,
    key: &str,
    mut documents: Vec<Document>,
) -> SyncResult<usize> {
    let source_lu = source.lu_field();
    let target_lu = target.lu_field();

    for document in &mut documents {
        let raw = document
            .get(source_lu)
            .cloned()
            .ok_or_else(|| StoreError::missing_field(source.name(), source_lu))?;
        let canonical = source.normalize_lu(&raw)?;
        document.insert(target_lu, timestamp::to_value(canonical));
        if source_lu != target_lu {
            document.remove(source_lu);
        }
    }

    let count = documents.len();
    target.upsert(documents, key, false)?;
    debug!(target = target.name(), count, "batch upserted");
    Ok(count)
}
