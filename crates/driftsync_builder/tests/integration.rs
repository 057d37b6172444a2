//! Integration tests for the copy stage over in-memory stores.

use chrono::DateTime;
use driftsync_builder::{CopyBuilder, SyncError};
use driftsync_core::{timestamp, Document, Store};
use driftsync_memory::MemoryStore;
use proptest::prelude::*;
use serde_json::json;

fn doc(id: i64, ts: i64) -> Document {
    [("id", json!(id)), ("ts", json!(ts))].into_iter().collect()
}

fn source_with(docs: Vec<Document>) -> MemoryStore {
    let store = MemoryStore::new("source", "id", "ts")
        .with_index(&["ts"])
        .read_only();
    store.seed(docs).unwrap();
    store
}

fn target() -> MemoryStore {
    MemoryStore::new("target", "id", "ts")
}

/// Canonical form a copied lu value takes in the target.
fn lu_value(epoch_seconds: i64) -> serde_json::Value {
    timestamp::to_value(DateTime::from_timestamp(epoch_seconds, 0).unwrap())
}

#[test]
fn first_run_copies_everything_in_order() {
    let stage = CopyBuilder::new(
        source_with(vec![doc(2, 20), doc(1, 10)]),
        target(),
        None,
    );

    let report = stage.run().unwrap();
    assert_eq!(report.planned, 2);
    assert_eq!(report.copied, 2);

    let target = stage.target();
    assert_eq!(target.len(), 2);
    assert_eq!(
        target.get(&json!(1)).unwrap().get("ts"),
        Some(&lu_value(10))
    );
    assert_eq!(
        target.get(&json!(2)).unwrap().get("ts"),
        Some(&lu_value(20))
    );
}

#[test]
fn second_run_with_no_new_writes_plans_zero() {
    let stage = CopyBuilder::new(
        source_with(vec![doc(1, 10), doc(2, 20)]),
        target(),
        None,
    );
    stage.run().unwrap();

    let plan = stage.plan().unwrap();
    assert_eq!(plan.total(), 0);

    let report = stage.run().unwrap();
    assert_eq!(report.copied, 0);
    assert_eq!(stage.target().len(), 2);
}

#[test]
fn monotonic_mark_skips_late_arriving_older_documents() {
    let source = source_with(vec![doc(1, 10), doc(2, 20)]);
    let target = target();
    let stage = CopyBuilder::new(source, target, None);
    stage.run().unwrap();

    // A document written to the source after the first run, but with a
    // timestamp below the high-water mark, is never selected. This is the
    // accepted boundary behavior of high-water-mark filtering.
    stage.source().seed(vec![doc(3, 15)]).unwrap();

    let plan = stage.plan().unwrap();
    assert_eq!(plan.total(), 0);

    stage.run().unwrap();
    assert!(stage.target().get(&json!(3)).is_none());
}

#[test]
fn documents_newer_than_the_mark_are_picked_up() {
    let source = source_with(vec![doc(1, 10), doc(2, 20)]);
    let stage = CopyBuilder::new(source, target(), None);
    stage.run().unwrap();

    stage.source().seed(vec![doc(4, 25)]).unwrap();

    let report = stage.run().unwrap();
    assert_eq!(report.copied, 1);
    assert_eq!(stage.target().len(), 3);
    assert_eq!(
        stage.target().get(&json!(4)).unwrap().get("ts"),
        Some(&lu_value(25))
    );
}

#[test]
fn updates_to_existing_documents_propagate() {
    let source = source_with(vec![doc(1, 10), doc(2, 20)]);
    let stage = CopyBuilder::new(source, target(), None);
    stage.run().unwrap();

    let mut edited = doc(1, 30);
    edited.insert("body", json!("revised"));
    stage.source().seed(vec![edited]).unwrap();

    let report = stage.run().unwrap();
    assert_eq!(report.copied, 1);

    let written = stage.target().get(&json!(1)).unwrap();
    assert_eq!(written.get("body"), Some(&json!("revised")));
    assert_eq!(written.get("ts"), Some(&lu_value(30)));
    assert_eq!(stage.target().len(), 2);
}

#[test]
fn target_lu_comes_from_source_not_write_time() {
    let stage = CopyBuilder::new(source_with(vec![doc(1, 10)]), target(), None);
    stage.run().unwrap();

    // Upserting through the store's own path stamps wall-clock time; the
    // loader's value must instead be the normalized source timestamp.
    let written = stage.target().get(&json!(1)).unwrap();
    assert_eq!(written.get("ts"), Some(&lu_value(10)));
}

#[test]
fn differing_lu_field_names_are_renamed() {
    let source = source_with(vec![doc(1, 10)]);
    let target = MemoryStore::new("target", "id", "updated_at");
    let stage = CopyBuilder::new(source, target, None);
    stage.run().unwrap();

    let written = stage.target().get(&json!(1)).unwrap();
    assert!(!written.contains_field("ts"));
    assert_eq!(written.get("updated_at"), Some(&lu_value(10)));
}

#[test]
fn key_override_addresses_the_target() {
    let docs = vec![
        [("id", json!(1)), ("sku", json!("a-1")), ("ts", json!(10))]
            .into_iter()
            .collect(),
        [("id", json!(2)), ("sku", json!("b-2")), ("ts", json!(20))]
            .into_iter()
            .collect(),
    ];
    let stage = CopyBuilder::new(source_with(docs), target(), Some("sku"));
    stage.run().unwrap();

    let target = stage.target();
    assert_eq!(target.len(), 2);
    assert_eq!(target.get(&json!("a-1")).unwrap().get("id"), Some(&json!(1)));
    assert!(target.get(&json!(1)).is_none());
}

#[test]
fn missing_source_index_fails_before_any_fetch() {
    let source = MemoryStore::new("source", "id", "ts").read_only();
    source.seed(vec![doc(1, 10)]).unwrap();
    let stage = CopyBuilder::new(source, target(), None);

    let err = stage.run().unwrap_err();
    assert!(matches!(err, SyncError::IndexMissing { store, .. } if store == "source"));
    assert!(stage.target().is_empty());
}

#[test]
fn transform_shapes_documents_before_load() {
    let stage = CopyBuilder::new(source_with(vec![doc(1, 10)]), target(), None)
        .with_transform(|mut document: Document| {
            document.insert("origin", json!("source"));
            document
        });

    stage.run().unwrap();

    let written = stage.target().get(&json!(1)).unwrap();
    assert_eq!(written.get("origin"), Some(&json!("source")));
    assert_eq!(written.get("ts"), Some(&lu_value(10)));
}

proptest! {
    /// Plans yield documents in non-decreasing lu order.
    #[test]
    fn plan_is_sorted_nondecreasing(docs in prop::collection::btree_map(0i64..500, 0i64..2_000_000_000, 0..24)) {
        let documents = docs.iter().map(|(&id, &ts)| doc(id, ts)).collect();
        let stage = CopyBuilder::new(source_with(documents), target(), None);

        let source = stage.source();
        let stamps: Vec<_> = stage
            .plan()
            .unwrap()
            .into_documents()
            .map(|d| source.normalize_lu(d.unwrap().get("ts").unwrap()).unwrap())
            .collect();
        prop_assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    /// A second run over an unchanged source always plans zero documents.
    #[test]
    fn reruns_converge_to_zero(docs in prop::collection::btree_map(0i64..500, 0i64..2_000_000_000, 0..24)) {
        let count = docs.len();
        let documents: Vec<Document> = docs.iter().map(|(&id, &ts)| doc(id, ts)).collect();
        let stage = CopyBuilder::new(source_with(documents), target(), None);

        let first = stage.run().unwrap();
        prop_assert_eq!(first.copied, count);
        prop_assert_eq!(stage.plan().unwrap().total(), 0);
    }
}

/// Ensures documents flow through as a single consumable sequence: the
/// plan's count matches what the cursor actually yields.
#[test]
fn plan_count_matches_yielded_documents() {
    let stage = CopyBuilder::new(
        source_with(vec![doc(1, 10), doc(2, 20), doc(3, 30)]),
        target(),
        None,
    );

    let plan = stage.plan().unwrap();
    let total = plan.total();
    let yielded = plan.into_documents().count();
    assert_eq!(total, yielded);
}
