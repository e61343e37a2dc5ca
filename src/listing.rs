//! Sorting and filtering helpers for presenting tracked items.

use crate::types::TrackedItem;
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// Sort order for item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Soonest due first
    #[default]
    NextReview,
    /// Hardest first
    Difficulty,
    /// Longest streak first
    Streak,
}

impl FromStr for SortKey {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" | "next_review" => Ok(SortKey::NextReview),
            "difficulty" => Ok(SortKey::Difficulty),
            "streak" => Ok(SortKey::Streak),
            other => Err(eyre::eyre!(
                "unknown sort key '{}': expected next, difficulty or streak",
                other
            )),
        }
    }
}

/// Listing filter.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive title substring
    pub search: Option<String>,
    /// Only items due now
    pub overdue_only: bool,
    pub sort: SortKey,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn overdue_only(mut self, overdue_only: bool) -> Self {
        self.overdue_only = overdue_only;
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Filter and sort `items`.
    pub fn apply(&self, items: Vec<TrackedItem>, now: DateTime<Utc>) -> Vec<TrackedItem> {
        let needle = self.search.as_ref().map(|s| s.to_lowercase());

        let mut out: Vec<TrackedItem> = items
            .into_iter()
            .filter(|item| match &needle {
                Some(n) => item.title.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .filter(|item| !self.overdue_only || item.is_due(now))
            .collect();

        sort_items(&mut out, self.sort);
        out
    }
}

/// Stable sort by the given key.
pub fn sort_items(items: &mut [TrackedItem], key: SortKey) {
    match key {
        SortKey::NextReview => items.sort_by_key(|item| item.next_review),
        SortKey::Difficulty => items.sort_by(|a, b| b.difficulty.cmp(&a.difficulty)),
        SortKey::Streak => items.sort_by(|a, b| b.streak_count.cmp(&a.streak_count)),
    }
}
