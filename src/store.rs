//! High-level review store.

use crate::config::StoreConfig;
use crate::content::ContentResolver;
use crate::events::{Listeners, StoreEvent, SubscriptionId};
use crate::schedule::{self, ScheduleState};
use crate::storage::Backend;
use crate::types::{Collection, DEFAULT_DIFFICULTY, ItemRecord, MAX_DIFFICULTY, MIN_DIFFICULTY, Outcome, TrackedItem};
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Errors surfaced to callers of the store.
#[derive(Debug)]
pub enum StoreError {
    /// Imported text is not a collection document.
    InvalidFormat(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidFormat(reason) => write!(f, "invalid review data format: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// The review store: owns the collection and keeps it persisted.
///
/// Every mutating operation updates memory first, then saves, then notifies
/// listeners. Save failures are logged and do not undo the mutation.
pub struct ReviewStore<B, R> {
    config: StoreConfig,
    backend: B,
    resolver: R,
    data: Collection,
    listeners: Listeners,
}

impl<B: Backend, R: ContentResolver> ReviewStore<B, R> {
    /// Open a store, loading whatever the backend holds.
    ///
    /// A backend that fails to load leaves the store empty.
    pub fn new(config: StoreConfig, mut backend: B, resolver: R) -> Self {
        let data = match backend.load() {
            Ok(Some(collection)) => {
                log::debug!("Loaded {} tracked notes", collection.len());
                collection
            }
            Ok(None) => Collection::default(),
            Err(e) => {
                log::warn!("Failed to load review data, starting empty: {:#}", e);
                Collection::default()
            }
        };

        Self {
            config,
            backend,
            resolver,
            data,
            listeners: Listeners::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// The raw collection as currently held in memory.
    pub fn collection(&self) -> &Collection {
        &self.data
    }

    /// Register a listener for change notifications.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Save and announce the change.
    fn commit(&mut self) {
        self.data.last_updated = Utc::now();
        if let Err(e) = self.backend.save(&self.data) {
            log::error!("Failed to save review data: {:#}", e);
        }
        self.listeners.notify(&StoreEvent::DataChanged);
    }

    /// Look up one tracked note without pruning.
    pub fn get(&self, id: &str) -> Option<TrackedItem> {
        self.data
            .notes
            .get(id)
            .map(|record| TrackedItem::from_record(id, self.resolver.display_name(id), record))
    }

    /// All tracked notes whose content still exists.
    ///
    /// Records whose note vanished are dropped and the pruned collection is
    /// saved once.
    pub fn all_items(&mut self) -> Vec<TrackedItem> {
        let mut items = Vec::with_capacity(self.data.notes.len());
        let mut missing = Vec::new();

        for (id, record) in &self.data.notes {
            if self.resolver.exists(id) {
                items.push(TrackedItem::from_record(id, self.resolver.display_name(id), record));
            } else {
                missing.push(id.clone());
            }
        }

        if !missing.is_empty() {
            for id in &missing {
                self.data.notes.remove(id);
                log::info!("Dropped {} from review: note no longer exists", id);
            }
            self.commit();
        }

        items
    }

    /// Due notes, capped at the configured batch size.
    pub fn items_to_review(&mut self) -> Vec<TrackedItem> {
        self.items_to_review_at(Utc::now())
    }

    pub fn items_to_review_at(&mut self, now: DateTime<Utc>) -> Vec<TrackedItem> {
        let limit = self.config.max_items_per_batch;
        self.all_items()
            .into_iter()
            .filter(|item| item.is_due(now))
            .take(limit)
            .collect()
    }

    /// Enroll a note, replacing any existing schedule for it.
    ///
    /// Intervals below one day are raised to one.
    pub fn add_item(&mut self, id: &str, initial_interval_days: i64) {
        self.add_item_at(id, initial_interval_days, Utc::now());
    }

    pub fn add_item_at(&mut self, id: &str, initial_interval_days: i64, now: DateTime<Utc>) {
        let interval = initial_interval_days.clamp(1, i64::from(u32::MAX)) as u32;
        if i64::from(interval) != initial_interval_days {
            log::warn!(
                "Initial interval {} for {} out of range, using {}",
                initial_interval_days,
                id,
                interval
            );
        }

        self.data
            .notes
            .insert(id.to_string(), ItemRecord::enroll(id, interval, now));
        log::debug!("Added {} with interval {}d", id, interval);
        self.commit();
    }

    /// Record a review outcome.
    ///
    /// Returns false, without saving, if `id` is not tracked or its note is gone.
    pub fn review_item(&mut self, id: &str, outcome: Outcome) -> bool {
        self.review_item_at(id, outcome, Utc::now())
    }

    pub fn review_item_at(&mut self, id: &str, outcome: Outcome, now: DateTime<Utc>) -> bool {
        let Some(record) = self.data.notes.get_mut(id) else {
            log::debug!("Ignoring {} review of untracked {}", outcome, id);
            return false;
        };
        if !self.resolver.exists(id) {
            log::debug!("Ignoring {} review of {}: note no longer exists", outcome, id);
            return false;
        }

        let next = schedule::apply(&ScheduleState::from(&*record), outcome, now);
        next.write_to(record);
        log::debug!(
            "Reviewed {} ({}): interval {}d, difficulty {}, streak {}",
            id,
            outcome,
            next.interval,
            next.difficulty,
            next.streak_count
        );

        self.commit();
        true
    }

    /// Stop tracking a note. Returns whether it was tracked.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let removed = self.data.notes.remove(id).is_some();
        log::debug!("Removed {} (was tracked: {})", id, removed);
        self.commit();
        removed
    }

    /// Insert records for ids not already tracked. Returns how many were added.
    pub fn merge_missing(&mut self, records: impl IntoIterator<Item = (String, ItemRecord)>) -> usize {
        let mut added = 0;
        for (id, mut record) in records {
            if self.data.notes.contains_key(&id) {
                continue;
            }
            record.clamp();
            self.data.notes.insert(id, record);
            added += 1;
        }

        if added > 0 {
            log::info!("Merged {} records", added);
            self.commit();
        }
        added
    }

    /// Serialize the whole collection as pretty JSON.
    pub fn export_snapshot(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.data).context("Failed to serialize review data")
    }

    /// Replace the collection with a previously exported snapshot.
    ///
    /// Nothing changes unless the whole document parses.
    pub fn import_snapshot(&mut self, text: &str) -> Result<()> {
        let collection = parse_snapshot(text)?;

        log::info!("Imported {} tracked notes", collection.len());
        self.data = collection;
        self.commit();
        Ok(())
    }
}

/// A record as it may appear in a snapshot written by hand or by another tool.
///
/// Numbers are read signed and clamped afterwards; the dates are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord {
    #[serde(default)]
    file_path: Option<String>,
    date_added: DateTime<Utc>,
    last_reviewed: DateTime<Utc>,
    next_review: DateTime<Utc>,
    #[serde(default)]
    interval: Option<i64>,
    #[serde(default)]
    difficulty: Option<i64>,
    #[serde(default)]
    review_count: i64,
    #[serde(default)]
    streak_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDocument {
    notes: BTreeMap<String, SnapshotRecord>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

fn to_u32(value: i64, min: u32) -> u32 {
    value.clamp(i64::from(min), i64::from(u32::MAX)) as u32
}

impl SnapshotRecord {
    fn into_record(self, id: &str) -> ItemRecord {
        let interval = self.interval.unwrap_or(1);
        let difficulty = self.difficulty.unwrap_or(i64::from(DEFAULT_DIFFICULTY));

        let record = ItemRecord {
            file_path: self.file_path.unwrap_or_else(|| id.to_string()),
            date_added: self.date_added,
            last_reviewed: self.last_reviewed,
            next_review: self.next_review,
            interval: to_u32(interval, 1),
            difficulty: difficulty.clamp(i64::from(MIN_DIFFICULTY), i64::from(MAX_DIFFICULTY)) as u8,
            review_count: to_u32(self.review_count, 0),
            streak_count: to_u32(self.streak_count, 0),
        };

        let changed = i64::from(record.interval) != interval
            || i64::from(record.difficulty) != difficulty
            || i64::from(record.review_count) != self.review_count
            || i64::from(record.streak_count) != self.streak_count;
        if changed {
            log::warn!("Clamped out-of-range fields for {}", id);
        }
        record
    }
}

/// Parse a collection document, rejecting anything without a `notes` mapping.
///
/// Out-of-range numbers are clamped into their valid ranges. Missing or
/// unparseable dates reject the whole document.
pub fn parse_snapshot(text: &str) -> Result<Collection> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| eyre::eyre!(StoreError::InvalidFormat(e.to_string())))?;

    if !value.get("notes").is_some_and(|notes| notes.is_object()) {
        return Err(eyre::eyre!(StoreError::InvalidFormat(
            "expected an object with a \"notes\" mapping".to_string()
        )));
    }

    let document: SnapshotDocument =
        serde_json::from_value(value).map_err(|e| eyre::eyre!(StoreError::InvalidFormat(e.to_string())))?;

    let mut collection = Collection::default();
    if let Some(version) = document.version {
        collection.version = version;
    }
    if let Some(last_updated) = document.last_updated {
        collection.last_updated = last_updated;
    }
    collection.notes = document
        .notes
        .into_iter()
        .map(|(id, record)| {
            let record = record.into_record(&id);
            (id, record)
        })
        .collect();
    Ok(collection)
}
