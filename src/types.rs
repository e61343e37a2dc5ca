//! Core data types for the review collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Schema version written into every collection document.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Lowest (easiest) difficulty rating.
pub const MIN_DIFFICULTY: u8 = 1;

/// Highest (hardest) difficulty rating.
pub const MAX_DIFFICULTY: u8 = 5;

/// Difficulty assigned to newly enrolled items.
pub const DEFAULT_DIFFICULTY: u8 = 3;

/// A note enrolled in the review schedule, as seen by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedItem {
    /// Content path relative to the vault root
    pub id: String,

    /// Display label resolved from the content, not persisted
    pub title: String,

    /// Path of the backing note (same as id)
    pub file_path: String,

    /// First enrollment, never changes afterwards
    pub date_added: DateTime<Utc>,

    /// Most recent completed review
    pub last_reviewed: DateTime<Utc>,

    /// Due at or after this instant
    pub next_review: DateTime<Utc>,

    /// Days between reviews, always >= 1
    pub interval: u32,

    /// 1 (easiest) to 5 (hardest)
    pub difficulty: u8,

    /// Completed, non-postponed reviews
    pub review_count: u32,

    /// Consecutive non-"again" reviews
    pub streak_count: u32,
}

impl TrackedItem {
    /// Build the caller-facing view of a stored record.
    pub fn from_record(id: &str, title: impl Into<String>, record: &ItemRecord) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            file_path: record.file_path.clone(),
            date_added: record.date_added,
            last_reviewed: record.last_reviewed,
            next_review: record.next_review,
            interval: record.interval,
            difficulty: record.difficulty,
            review_count: record.review_count,
            streak_count: record.streak_count,
        }
    }

    /// True when the item is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

/// Persisted shape of a single tracked note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub file_path: String,
    pub date_added: DateTime<Utc>,
    pub last_reviewed: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    pub interval: u32,
    pub difficulty: u8,
    pub review_count: u32,
    pub streak_count: u32,
}

impl ItemRecord {
    /// A fresh enrollment starting at `now`.
    pub fn enroll(file_path: &str, interval_days: u32, now: DateTime<Utc>) -> Self {
        let interval = interval_days.max(1);
        Self {
            file_path: file_path.to_string(),
            date_added: now,
            last_reviewed: now,
            next_review: crate::dates::add_days(now, interval),
            interval,
            difficulty: DEFAULT_DIFFICULTY,
            review_count: 0,
            streak_count: 0,
        }
    }

    /// Pull fields back into their valid ranges. Returns true if anything changed.
    pub fn clamp(&mut self) -> bool {
        let before = (self.interval, self.difficulty);
        self.interval = self.interval.max(1);
        self.difficulty = self.difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        before != (self.interval, self.difficulty)
    }
}

/// The whole persisted document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub notes: BTreeMap<String, ItemRecord>,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            notes: BTreeMap::new(),
            version: default_version(),
            last_updated: Utc::now(),
        }
    }
}

impl Collection {
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Self-reported recall quality, or a deferral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Again,
    Hard,
    Good,
    Easy,
    Postpone,
}

impl Outcome {
    /// All outcomes in button order.
    pub const ALL: [Outcome; 5] = [
        Outcome::Again,
        Outcome::Hard,
        Outcome::Good,
        Outcome::Easy,
        Outcome::Postpone,
    ];

    /// Postponing defers the item without counting as a review.
    pub fn is_review(&self) -> bool {
        !matches!(self, Outcome::Postpone)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Again => "again",
            Outcome::Hard => "hard",
            Outcome::Good => "good",
            Outcome::Easy => "easy",
            Outcome::Postpone => "postpone",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized outcome name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcomeError(pub String);

impl fmt::Display for ParseOutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown outcome '{}': expected again, hard, good, easy or postpone",
            self.0
        )
    }
}

impl std::error::Error for ParseOutcomeError {}

impl FromStr for Outcome {
    type Err = ParseOutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "1" => Ok(Outcome::Again),
            "hard" | "2" => Ok(Outcome::Hard),
            "good" | "3" => Ok(Outcome::Good),
            "easy" | "4" => Ok(Outcome::Easy),
            "postpone" | "later" => Ok(Outcome::Postpone),
            _ => Err(ParseOutcomeError(s.to_string())),
        }
    }
}
