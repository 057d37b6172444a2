//! Error types for the copy stage.

use driftsync_core::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No usable index on any candidate field.
    ///
    /// Raised during planning, before any document is fetched. Filtered
    /// queries and keyed upserts must not degrade to full scans, and a
    /// source store may be accessed without index-creation rights, so a
    /// missing index cannot be silently repaired.
    #[error("no index on any of {fields:?} for store {store}")]
    IndexMissing {
        /// Name of the offending store.
        store: String,
        /// Candidate fields, in the order they were tried.
        fields: Vec<String>,
    },

    /// Store failure during query or upsert, propagated unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Creates an index-missing error.
    pub fn index_missing(store: impl Into<String>, fields: &[&str]) -> Self {
        Self::IndexMissing {
            store: store.into(),
            fields: fields.iter().map(|f| (*f).to_owned()).collect(),
        }
    }
}
