//! Shared test infrastructure for revisit integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use revisit::{JsonFileBackend, Outcome, ReviewStore, StoreConfig, TrackedItem, VaultResolver};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type VaultStore = ReviewStore<JsonFileBackend, VaultResolver>;

/// Fixed reference instant used by time-dependent tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 9, 30, 0).unwrap()
}

/// Test environment with a temporary notes folder and automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub store: VaultStore,
}

impl TestEnv {
    /// Create a new test environment with an empty store.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a test environment with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = open(temp_dir.path(), config);
        Self { temp_dir, store }
    }

    pub fn vault(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the persisted document.
    pub fn data_path(&self) -> PathBuf {
        revisit::storage::default_data_path(self.vault())
    }

    /// Write a note file into the vault.
    pub fn write_note(&self, id: &str) {
        let path = self.vault().join(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create note dir");
        }
        fs::write(&path, format!("# {}\n", id)).expect("Failed to write note");
    }

    /// Delete a note file from the vault.
    pub fn delete_note(&self, id: &str) {
        fs::remove_file(self.vault().join(id)).expect("Failed to delete note");
    }

    /// Write a note and enroll it at `t0()`.
    pub fn add_note(&mut self, id: &str, interval: i64) -> TrackedItem {
        self.write_note(id);
        self.store.add_item_at(id, interval, t0());
        self.store.get(id).expect("Failed to get added note")
    }

    /// Review a tracked note and return its new state.
    pub fn review(&mut self, id: &str, outcome: Outcome, at: DateTime<Utc>) -> TrackedItem {
        assert!(self.store.review_item_at(id, outcome, at), "{} is not tracked", id);
        self.store.get(id).expect("Failed to get reviewed note")
    }

    /// Reopen the store from disk with the current configuration.
    pub fn reopen(&mut self) {
        let config = self.store.config().clone();
        self.store = open(self.vault(), config);
    }

    /// Ids returned by `all_items`, sorted.
    pub fn ids(&mut self) -> Vec<String> {
        let mut ids: Vec<String> = self.store.all_items().into_iter().map(|i| i.id).collect();
        ids.sort();
        ids
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn open(vault: &Path, config: StoreConfig) -> VaultStore {
    ReviewStore::new(config, JsonFileBackend::for_vault(vault), VaultResolver::new(vault))
}
