//! Integration tests for the review lifecycle.
//!
//! Tests scheduling through the store, persistence and pruning.

mod common;

use chrono::Duration;
use common::{TestEnv, t0};
use revisit::{Outcome, StoreConfig, StoreEvent};
use std::cell::RefCell;
use std::rc::Rc;

// =============================================================================
// Scheduling Scenarios
// =============================================================================

#[test]
fn test_hard_on_interval_four() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 4);

    let item = env.review("a.md", Outcome::Hard, t0());
    assert_eq!(item.interval, 3);
    assert_eq!(item.difficulty, 3);
    assert_eq!(item.streak_count, 1);
    assert_eq!(item.next_review, t0() + Duration::days(3));
}

#[test]
fn test_good_on_interval_four() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 4);

    let item = env.review("a.md", Outcome::Good, t0());
    assert_eq!(item.interval, 6);
}

#[test]
fn test_easy_on_interval_one_difficulty_four() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 1);
    // Push difficulty from 3 to 4
    env.review("a.md", Outcome::Again, t0());

    let item = env.review("a.md", Outcome::Easy, t0() + Duration::days(1));
    assert_eq!(item.interval, 3);
    assert_eq!(item.difficulty, 3);
}

#[test]
fn test_again_always_resets() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 30);
    env.review("a.md", Outcome::Easy, t0());
    env.review("a.md", Outcome::Good, t0() + Duration::days(62));

    let item = env.review("a.md", Outcome::Again, t0() + Duration::days(200));
    assert_eq!(item.interval, 1);
    assert_eq!(item.streak_count, 0);
    assert_eq!(item.review_count, 3);
}

#[test]
fn test_postpone_only_moves_next_review() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 5);
    let before = env.review("a.md", Outcome::Good, t0());

    let later = t0() + Duration::days(9);
    let after = env.review("a.md", Outcome::Postpone, later);

    assert_eq!(after.next_review, later + Duration::days(1));
    assert_eq!(after.last_reviewed, before.last_reviewed);
    assert_eq!(after.interval, before.interval);
    assert_eq!(after.difficulty, before.difficulty);
    assert_eq!(after.review_count, before.review_count);
    assert_eq!(after.streak_count, before.streak_count);
    assert_eq!(after.date_added, before.date_added);
}

#[test]
fn test_invariants_across_review_sequence() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 1);

    let outcomes = [
        Outcome::Easy,
        Outcome::Easy,
        Outcome::Again,
        Outcome::Again,
        Outcome::Again,
        Outcome::Again,
        Outcome::Hard,
        Outcome::Postpone,
        Outcome::Good,
        Outcome::Easy,
        Outcome::Easy,
        Outcome::Easy,
        Outcome::Easy,
    ];

    let mut at = t0();
    for outcome in outcomes {
        at += Duration::days(1);
        let item = env.review("a.md", outcome, at);
        assert!(item.interval >= 1);
        assert!((1..=5).contains(&item.difficulty));
        assert!(item.next_review >= item.last_reviewed);
    }

    let item = env.store.get("a.md").unwrap();
    assert_eq!(item.review_count, 12);
    assert_eq!(item.difficulty, 1);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_state_survives_reopen() {
    let mut env = TestEnv::new();
    env.add_note("notes/rust.md", 2);
    let reviewed = env.review("notes/rust.md", Outcome::Good, t0());

    env.reopen();

    let item = env.store.get("notes/rust.md").unwrap();
    assert_eq!(item, reviewed);
    assert_eq!(item.title, "rust");
}

#[test]
fn test_document_shape_on_disk() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 1);

    let text = std::fs::read_to_string(env.data_path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(json["version"], "1.0.0");
    assert!(json["lastUpdated"].is_string());
    let note = &json["notes"]["a.md"];
    assert_eq!(note["filePath"], "a.md");
    assert_eq!(note["interval"], 1);
    assert_eq!(note["difficulty"], 3);
    assert_eq!(note["reviewCount"], 0);
    assert_eq!(note["streakCount"], 0);
}

#[test]
fn test_export_import_round_trip() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 3);
    env.add_note("b/c.md", 10);
    env.review("a.md", Outcome::Hard, t0() + Duration::days(3));

    let snapshot = env.store.export_snapshot().unwrap();
    let before = env.store.collection().clone();

    env.store.import_snapshot(&snapshot).unwrap();
    let after = env.store.collection();

    assert_eq!(after.notes, before.notes);
    assert_eq!(after.version, before.version);
}

#[test]
fn test_import_into_other_store() {
    let mut source = TestEnv::new();
    source.add_note("a.md", 3);
    let snapshot = source.store.export_snapshot().unwrap();

    let mut target = TestEnv::new();
    target.add_note("old.md", 1);
    target.write_note("a.md");
    target.store.import_snapshot(&snapshot).unwrap();

    assert_eq!(target.ids(), vec!["a.md".to_string()]);

    target.reopen();
    assert_eq!(target.ids(), vec!["a.md".to_string()]);
}

// =============================================================================
// Pruning and Notifications
// =============================================================================

#[test]
fn test_deleted_note_is_pruned_once() {
    let mut env = TestEnv::new();
    env.add_note("keep.md", 1);
    env.add_note("gone.md", 1);

    let events = Rc::new(RefCell::new(Vec::new()));
    let e = Rc::clone(&events);
    env.store.subscribe(move |event| e.borrow_mut().push(*event));

    env.delete_note("gone.md");

    assert_eq!(env.ids(), vec!["keep.md".to_string()]);
    assert_eq!(*events.borrow(), vec![StoreEvent::DataChanged]);

    // Second pass finds nothing to prune
    assert_eq!(env.ids(), vec!["keep.md".to_string()]);
    assert_eq!(events.borrow().len(), 1);

    // The pruned collection reached disk
    env.reopen();
    assert!(env.store.get("gone.md").is_none());
}

#[test]
fn test_enumeration_is_idempotent() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 1);
    env.add_note("b.md", 4);
    env.add_note("c.md", 9);

    let first = env.ids();
    let second = env.ids();
    assert_eq!(first, second);
}

#[test]
fn test_notifications_per_operation() {
    let mut env = TestEnv::new();
    let count = Rc::new(RefCell::new(0));
    let c = Rc::clone(&count);
    let id = env.store.subscribe(move |_| *c.borrow_mut() += 1);

    env.add_note("a.md", 1);
    env.review("a.md", Outcome::Good, t0());
    env.store.review_item_at("missing.md", Outcome::Good, t0());
    let snapshot = env.store.export_snapshot().unwrap();
    env.store.import_snapshot(&snapshot).unwrap();
    env.store.remove_item("a.md");
    assert_eq!(*count.borrow(), 4);

    assert!(env.store.unsubscribe(id));
    env.add_note("b.md", 1);
    assert_eq!(*count.borrow(), 4);
}

// =============================================================================
// Review Batches
// =============================================================================

#[test]
fn test_items_to_review_filters_and_caps() {
    let mut env = TestEnv::with_config(StoreConfig::new().max_items_per_batch(2));
    env.add_note("a.md", 1);
    env.add_note("b.md", 1);
    env.add_note("c.md", 1);
    env.add_note("later.md", 30);

    let now = t0() + Duration::days(2);
    let batch = env.store.items_to_review_at(now);
    let ids: Vec<&str> = batch.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a.md", "b.md"]);

    let again = env.store.items_to_review_at(now);
    assert_eq!(again, batch);
}

#[test]
fn test_nothing_due_before_interval() {
    let mut env = TestEnv::new();
    env.add_note("a.md", 3);

    assert!(env.store.items_to_review_at(t0() + Duration::days(2)).is_empty());
    assert_eq!(env.store.items_to_review_at(t0() + Duration::days(3)).len(), 1);
}
