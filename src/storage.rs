//! Persistence backends for the review collection.

use crate::types::Collection;
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory inside the vault holding revisit's own files.
pub const REVISIT_DIR: &str = ".revisit";

/// Collection document file name.
pub const DATA_FILE: &str = "data.json";

/// Blob storage for the collection document.
pub trait Backend {
    /// Load the stored document, `None` when nothing was saved yet.
    fn load(&mut self) -> Result<Option<Collection>>;

    /// Replace the stored document.
    fn save(&mut self, collection: &Collection) -> Result<()>;
}

/// Default data file location for a vault.
pub fn default_data_path(vault: &Path) -> PathBuf {
    vault.join(REVISIT_DIR).join(DATA_FILE)
}

/// One pretty-printed JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend at the default location inside `vault`.
    pub fn for_vault(vault: &Path) -> Self {
        Self::new(default_data_path(vault))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for JsonFileBackend {
    fn load(&mut self) -> Result<Option<Collection>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let collection = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;

        Ok(Some(collection))
    }

    fn save(&mut self, collection: &Collection) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(collection).context("Failed to serialize collection")?;

        // Write alongside and rename so a crash never leaves a torn file
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}

/// In-process backend. Keeps the last saved document and counts saves.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    document: Option<Collection>,
    saves: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    pub fn with_document(collection: Collection) -> Self {
        Self {
            document: Some(collection),
            saves: 0,
        }
    }

    pub fn document(&self) -> Option<&Collection> {
        self.document.as_ref()
    }

    /// Number of successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Backend for MemoryBackend {
    fn load(&mut self) -> Result<Option<Collection>> {
        Ok(self.document.clone())
    }

    fn save(&mut self, collection: &Collection) -> Result<()> {
        self.document = Some(collection.clone());
        self.saves += 1;
        Ok(())
    }
}
