//! Change-detection planning.

use crate::error::SyncResult;
use crate::index_check::confirm_leading_index;
use driftsync_core::{DocumentCursor, Filter, SortSpec, Store};
use tracing::{debug, info};

/// The update set for one sync run.
///
/// Wraps the computed change-detection filter and the lazily fetched,
/// counted document sequence. Documents arrive sorted ascending by the
/// source's last-updated field, so an interrupted run leaves a tail that
/// the next run's recomputed high-water mark still selects.
#[derive(Debug)]
pub struct SyncPlan {
    filter: Filter,
    documents: DocumentCursor,
}

impl SyncPlan {
    /// The filter that selected this plan's documents.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Total number of documents the plan will yield.
    pub fn total(&self) -> usize {
        self.documents.total()
    }

    /// Consumes the plan, yielding its single-pass document sequence.
    pub fn into_documents(self) -> DocumentCursor {
        self.documents
    }
}

/// Plans a sync run from `source` into `target` addressed by `key`.
///
/// 1. Computes the change-detection filter from the target's current
///    high-water mark.
/// 2. Validates an index on the source's last-updated field. The source
///    is read-only for the whole run, so no creation is attempted.
/// 3. Attempts best-effort index creation on the target for `key`, then
///    validates an index exists on it.
/// 4. Issues the filtered query, sorted ascending by the source's
///    last-updated field.
pub(crate) fn plan(source: &dyn Store, target: &dyn Store, key: &str) -> SyncResult<SyncPlan> {
    let filter = source.sync_filter(target)?;
    debug!(source = source.name(), target = target.name(), ?filter, "computed sync filter");

    confirm_leading_index(source, &[source.lu_field()])?;
    target.ensure_index(key)?;
    confirm_leading_index(target, &[key])?;

    let sort = SortSpec::ascending(source.lu_field());
    let documents = source.query(&filter, Some(&sort))?;
    info!(
        source = source.name(),
        target = target.name(),
        total = documents.total(),
        "planned copy"
    );

    Ok(SyncPlan { filter, documents })
}
