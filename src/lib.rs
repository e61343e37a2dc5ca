//! Revisit: spaced review scheduling for a folder of notes.
//!
//! Revisit tracks which notes you want to come back to, works out when each
//! one is next due, and stretches or shrinks the gap based on how hard the
//! last review felt.
//!
//! # Example
//!
//! ```no_run
//! use revisit::{JsonFileBackend, Outcome, ReviewStore, StoreConfig, VaultResolver};
//! use std::path::Path;
//!
//! let vault = Path::new("notes");
//! let mut store = ReviewStore::new(
//!     StoreConfig::default(),
//!     JsonFileBackend::for_vault(vault),
//!     VaultResolver::new(vault),
//! );
//!
//! // Enroll a note, first review in three days
//! store.add_item("rust/ownership.md", 3);
//!
//! // Later: work through whatever is due
//! for item in store.items_to_review() {
//!     store.review_item(&item.id, Outcome::Good);
//! }
//! ```

mod types;

pub mod config;
pub mod content;
pub mod dates;
pub mod events;
pub mod listing;
pub mod migrate;
pub mod schedule;
pub mod stats;
pub mod storage;
pub mod store;

// Re-export public API
pub use config::StoreConfig;
pub use content::{ContentResolver, MemoryResolver, VaultResolver};
pub use events::{StoreEvent, SubscriptionId};
pub use listing::{ListFilter, SortKey};
pub use storage::{Backend, JsonFileBackend, MemoryBackend};
pub use store::{ReviewStore, StoreError};
pub use types::{Collection, ItemRecord, Outcome, ParseOutcomeError, SCHEMA_VERSION, TrackedItem};
