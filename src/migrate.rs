//! One-shot conversion of older review data into the current collection.
//!
//! Two sources are supported: a standalone JSON data file from an earlier
//! layout, and `spaced-repetition` blocks kept in note frontmatter. Neither is
//! used by the store during normal operation.

use crate::store::parse_snapshot;
use crate::types::{Collection, DEFAULT_DIFFICULTY, ItemRecord};
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Frontmatter key holding review data.
const FRONTMATTER_KEY: &str = "spaced-repetition";

/// Review data as it appeared in frontmatter. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontmatterEntry {
    date_added: Option<String>,
    last_reviewed: Option<String>,
    next_review: Option<String>,
    interval: Option<u32>,
    difficulty: Option<u8>,
    review_count: Option<u32>,
    streak_count: Option<u32>,
}

fn parse_time(value: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(fallback)
}

impl FrontmatterEntry {
    fn into_record(self, file_path: &str, now: DateTime<Utc>) -> ItemRecord {
        // Zero means "unset" in the old format
        let non_zero = |v: Option<u32>| v.filter(|n| *n > 0);

        let mut record = ItemRecord {
            file_path: file_path.to_string(),
            date_added: parse_time(self.date_added.as_deref(), now),
            last_reviewed: parse_time(self.last_reviewed.as_deref(), now),
            next_review: parse_time(self.next_review.as_deref(), now),
            interval: non_zero(self.interval).unwrap_or(1),
            difficulty: self.difficulty.filter(|d| *d > 0).unwrap_or(DEFAULT_DIFFICULTY),
            review_count: self.review_count.unwrap_or(0),
            streak_count: self.streak_count.unwrap_or(0),
        };
        record.clamp();
        record
    }
}

/// Read a legacy standalone data file.
pub fn from_legacy_file(path: &Path) -> Result<Collection> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read legacy data {}", path.display()))?;
    parse_snapshot(&content).with_context(|| format!("Failed to parse legacy data {}", path.display()))
}

/// Split YAML frontmatter off the front of a note.
fn frontmatter(content: &str) -> Option<&str> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;
    let end = rest.find("\n---")?;
    Some(&rest[..end])
}

/// Extract review data from one note's text, if it carries any.
pub fn record_from_note(file_path: &str, content: &str, now: DateTime<Utc>) -> Option<ItemRecord> {
    let yaml = frontmatter(content)?;
    let value: serde_yaml::Value = match serde_yaml::from_str(yaml) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Skipping unreadable frontmatter in {}: {}", file_path, e);
            return None;
        }
    };

    let block = value.get(FRONTMATTER_KEY)?;
    match serde_yaml::from_value::<FrontmatterEntry>(block.clone()) {
        Ok(entry) => Some(entry.into_record(file_path, now)),
        Err(e) => {
            log::warn!("Skipping malformed {} block in {}: {}", FRONTMATTER_KEY, file_path, e);
            None
        }
    }
}

fn collect_markdown(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let file_type = entry.file_type().context("Failed to read file type")?;
        if file_type.is_dir() {
            collect_markdown(&path, out)?;
        } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            out.push(path);
        }
    }
    Ok(())
}

/// Vault-relative id of a note path, with forward slashes.
fn note_id(vault: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(vault).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Scan every markdown note under `vault` for frontmatter review data.
///
/// Results are sorted by id.
pub fn from_frontmatter(vault: &Path, now: DateTime<Utc>) -> Result<Vec<(String, ItemRecord)>> {
    let mut paths = Vec::new();
    collect_markdown(vault, &mut paths)?;
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        let Some(id) = note_id(vault, &path) else {
            continue;
        };
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if let Some(record) = record_from_note(&id, &content, now) {
            records.push((id, record));
        }
    }

    log::info!("Found review data in {} notes", records.len());
    Ok(records)
}
