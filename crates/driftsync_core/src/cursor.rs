//! Counted single-pass document sequences.

use crate::document::Document;
use crate::error::StoreResult;

/// A lazy, finite, single-pass sequence of documents with a known total.
///
/// The total is known before the first document is fetched, so callers can
/// size batches or report progress without draining the sequence. The
/// cursor is consumed exactly once; it cannot be restarted mid-run.
pub struct DocumentCursor {
    total: usize,
    inner: Box<dyn Iterator<Item = StoreResult<Document>> + Send>,
}

impl DocumentCursor {
    /// Wraps an iterator together with its known total count.
    pub fn new<I>(total: usize, inner: I) -> Self
    where
        I: Iterator<Item = StoreResult<Document>> + Send + 'static,
    {
        Self {
            total,
            inner: Box::new(inner),
        }
    }

    /// Builds a cursor over an already-materialized batch.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let total = documents.len();
        Self::new(total, documents.into_iter().map(Ok))
    }

    /// Total number of documents this cursor will yield.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for DocumentCursor {
    type Item = StoreResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for DocumentCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCursor")
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}
