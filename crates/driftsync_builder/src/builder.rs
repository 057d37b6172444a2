//! The copy stage composing plan, transform, and load.

use crate::error::{SyncError, SyncResult};
use crate::load::load;
use crate::plan::{plan, SyncPlan};
use crate::transform::{Identity, Transform};
use driftsync_core::Store;
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Documents the plan selected.
    pub planned: usize,
    /// Documents upserted into the target.
    pub copied: usize,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

/// Syncs a source store into a target store.
///
/// One `CopyBuilder` is one stage of a document-processing pipeline; an
/// external execution engine invokes [`run`](Self::run) (or drives
/// [`plan`](Self::plan) and the transform itself when it parallelizes the
/// per-document work). Each run recomputes the change-detection filter
/// from current target state, so repeated runs converge: with no new
/// source writes, the second run plans zero documents.
///
/// The target is addressed by a configurable key, resolved once at
/// construction — an explicit override, else the target's own key field.
///
/// # Example
///
/// ```rust
/// use driftsync_builder::CopyBuilder;
/// use driftsync_memory::MemoryStore;
/// use serde_json::json;
///
/// let source = MemoryStore::new("source", "id", "ts").with_index(&["ts"]).read_only();
/// source.seed(vec![
///     [("id", json!(1)), ("ts", json!(10))].into_iter().collect(),
/// ])?;
/// let target = MemoryStore::new("target", "id", "ts");
///
/// let stage = CopyBuilder::new(source, target, None);
/// let report = stage.run()?;
/// assert_eq!(report.copied, 1);
/// # Ok::<(), driftsync_builder::SyncError>(())
/// ```
pub struct CopyBuilder<S: Store, T: Store> {
    source: S,
    target: T,
    key: String,
    transform: Box<dyn Transform>,
}

impl<S: Store, T: Store> CopyBuilder<S, T> {
    /// Creates a stage syncing `source` into `target`.
    ///
    /// `key` overrides the field addressing documents in the target;
    /// `None` uses the target's own key field.
    pub fn new(source: S, target: T, key: Option<&str>) -> Self {
        let key = key
            .map(str::to_owned)
            .unwrap_or_else(|| target.key_field().to_owned());
        Self {
            source,
            target,
            key,
            transform: Box::new(Identity),
        }
    }

    /// Replaces the per-document transform.
    ///
    /// The transform must leave the addressing-key value unchanged.
    pub fn with_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    /// The resolved addressing key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The source store.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The target store.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Plans this stage's update set without executing it.
    ///
    /// Validates indexes and issues the change-detection query; the
    /// returned plan carries the lazy document sequence and its count.
    pub fn plan(&self) -> SyncResult<SyncPlan> {
        plan(&self.source, &self.target, &self.key)
    }

    /// Runs one full sync: plan, transform each document, load the batch.
    pub fn run(&self) -> SyncResult<SyncReport> {
        let start = Instant::now();

        let plan = self.plan()?;
        let planned = plan.total();

        let mut batch = Vec::with_capacity(planned);
        for document in plan.into_documents() {
            let document = document.map_err(SyncError::from)?;
            batch.push(self.transform.transform(document));
        }

        let copied = load(&self.source, &self.target, &self.key, batch)?;

        let report = SyncReport {
            planned,
            copied,
            duration: start.elapsed(),
        };
        info!(
            source = self.source.name(),
            target = self.target.name(),
            planned = report.planned,
            copied = report.copied,
            "sync run complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftsync_memory::MemoryStore;

    #[test]
    fn key_defaults_to_target_key_field() {
        let source = MemoryStore::new("source", "sid", "ts");
        let target = MemoryStore::new("target", "tid", "ts");
        let stage = CopyBuilder::new(source, target, None);
        assert_eq!(stage.key(), "tid");
    }

    #[test]
    fn key_override_wins() {
        let source = MemoryStore::new("source", "sid", "ts");
        let target = MemoryStore::new("target", "tid", "ts");
        let stage = CopyBuilder::new(source, target, Some("sku"));
        assert_eq!(stage.key(), "sku");
    }
}
