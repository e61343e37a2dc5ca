//! Store configuration.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Config file name inside the `.revisit` directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Default cap on items handed out per review batch.
const DEFAULT_MAX_ITEMS_PER_BATCH: usize = 20;

/// Default first interval for newly added notes, in days.
const DEFAULT_INTERVAL_DAYS: u32 = 1;

/// Configuration passed into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct StoreConfig {
    /// Maximum number of due items returned by one review batch
    pub max_items_per_batch: usize,

    /// Initial interval used when none is given
    pub default_interval: u32,

    /// Whether the reminder loop announces due items
    pub notification_enabled: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_items_per_batch: DEFAULT_MAX_ITEMS_PER_BATCH,
            default_interval: DEFAULT_INTERVAL_DAYS,
            notification_enabled: true,
        }
    }
}

impl StoreConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch cap.
    pub fn max_items_per_batch(mut self, max: usize) -> Self {
        self.max_items_per_batch = max;
        self
    }

    /// Set the default initial interval (clamped to at least one day).
    pub fn default_interval(mut self, days: u32) -> Self {
        self.default_interval = days.max(1);
        self
    }

    /// Enable or disable reminders.
    pub fn notification_enabled(mut self, enabled: bool) -> Self {
        self.notification_enabled = enabled;
        self
    }

    /// Load from a YAML file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.default_interval = config.default_interval.max(1);

        Ok(config)
    }
}
