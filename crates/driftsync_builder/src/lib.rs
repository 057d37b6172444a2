//! # Driftsync Builder
//!
//! Incremental, timestamp-driven copy stage between document stores.
//!
//! A [`CopyBuilder`] syncs a read-only **source** store into a writable
//! **target** store: only documents whose last-updated value is strictly
//! newer than the target's high-water mark are fetched, each passes
//! through a [`Transform`], and the batch is upserted into the target
//! keyed by a configurable field.
//!
//! The stage is one unit of a larger pipeline; an external execution
//! engine drives [`CopyBuilder::run`] and owns retries, parallelism, and
//! progress rendering.
//!
//! ## Key invariants
//!
//! - Index validation happens before any document is fetched; a missing
//!   index is fatal, never silently repaired on the source.
//! - Planned documents are sorted ascending by the source's last-updated
//!   field, so an interrupted run resumes from a recomputed high-water
//!   mark without skipping documents.
//! - The target's own last-updated stamping is disabled during load; the
//!   value written is derived from the source's true update time.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod error;
mod index_check;
mod load;
mod plan;
mod transform;

pub use builder::{CopyBuilder, SyncReport};
pub use error::{SyncError, SyncResult};
pub use index_check::confirm_leading_index;
pub use plan::SyncPlan;
pub use transform::{Identity, Transform};
