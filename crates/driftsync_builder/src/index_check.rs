//! Index-presence validation.

use crate::error::{SyncError, SyncResult};
use driftsync_core::Store;

/// Confirms the store has an index whose leading field is one of
/// `candidates`.
///
/// Candidates are tried in the order given; the first with a matching
/// index satisfies the check. Fails with [`SyncError::IndexMissing`]
/// naming the store and all candidate fields when none matches.
///
/// Runs once per store per sync run, before any document is fetched: a
/// filtered query or keyed upsert against an unindexed field would
/// degrade to a full scan, and the check cannot be repaired in place on
/// stores accessed without index-creation rights.
pub fn confirm_leading_index(store: &dyn Store, candidates: &[&str]) -> SyncResult<()> {
    let indexed = store.indexed_fields()?;
    for candidate in candidates {
        if indexed.iter().any(|field| field == candidate) {
            return Ok(());
        }
    }
    Err(SyncError::index_missing(store.name(), candidates))
}
