//! # Driftsync Core
//!
//! Document and store model for driftsync.
//!
//! This crate provides:
//! - Schema-less, insertion-ordered [`Document`] records
//! - Canonical last-updated timestamps and normalization
//! - Change-detection [`Filter`]s and [`SortSpec`]s
//! - Counted single-pass [`DocumentCursor`]s
//! - The abstract [`Store`] capability trait

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cursor;
mod document;
mod error;
mod filter;
mod store;
pub mod timestamp;

pub use cursor::DocumentCursor;
pub use document::Document;
pub use error::{StoreError, StoreResult};
pub use filter::{compare_values, Filter, SortOrder, SortSpec};
pub use store::Store;
pub use timestamp::{LuNormalizer, Timestamp};

pub use serde_json::Value;
