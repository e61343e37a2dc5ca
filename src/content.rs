//! Resolution of tracked ids against the live note folder.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Answers whether a tracked note still exists and how to label it.
pub trait ContentResolver {
    /// True if the note behind `id` is still present.
    fn exists(&self, id: &str) -> bool;

    /// Display label for `id`.
    fn display_name(&self, id: &str) -> String;
}

/// Label derived from a note path: the file name without its extension.
pub fn title_from_path(id: &str) -> String {
    Path::new(id)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| id.to_string())
}

/// True if `id` is a relative path that stays inside the vault.
///
/// Empty ids, absolute paths and any `..` segment are rejected.
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && Path::new(id)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Resolver over a directory of notes. Ids are paths relative to the root.
#[derive(Debug, Clone)]
pub struct VaultResolver {
    root: PathBuf,
}

impl VaultResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the note behind `id`.
    pub fn path_of(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }
}

impl ContentResolver for VaultResolver {
    fn exists(&self, id: &str) -> bool {
        is_safe_id(id) && self.path_of(id).is_file()
    }

    fn display_name(&self, id: &str) -> String {
        title_from_path(id)
    }
}

/// Resolver over an in-memory set of ids, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    ids: HashSet<String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that knows exactly the given ids.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    /// Forget an id, as if the note was deleted.
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }
}

impl ContentResolver for MemoryResolver {
    fn exists(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn display_name(&self, id: &str) -> String {
        title_from_path(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_title_from_path() {
        assert_eq!(title_from_path("notes/Ownership.md"), "Ownership");
        assert_eq!(title_from_path("README"), "README");
        assert_eq!(title_from_path("deep/dir/archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn test_vault_resolver_exists() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("notes")).unwrap();
        fs::write(temp_dir.path().join("notes/a.md"), "# A").unwrap();

        let resolver = VaultResolver::new(temp_dir.path());
        assert!(resolver.exists("notes/a.md"));
        assert!(!resolver.exists("notes/b.md"));
        // Directories are not notes
        assert!(!resolver.exists("notes"));
        assert_eq!(resolver.display_name("notes/a.md"), "a");
    }

    #[test]
    fn test_is_safe_id() {
        assert!(is_safe_id("a.md"));
        assert!(is_safe_id("notes/deep/a.md"));
        assert!(is_safe_id("./a.md"));
        assert!(!is_safe_id(""));
        assert!(!is_safe_id("/etc/passwd"));
        assert!(!is_safe_id("../outside.md"));
        assert!(!is_safe_id("notes/../../outside.md"));
    }

    #[test]
    fn test_vault_resolver_stays_inside_root() {
        let temp_dir = TempDir::new().unwrap();
        let vault = temp_dir.path().join("vault");
        fs::create_dir_all(&vault).unwrap();
        fs::write(temp_dir.path().join("secret.md"), "outside").unwrap();

        let resolver = VaultResolver::new(&vault);
        assert!(!resolver.exists("../secret.md"));

        let absolute = temp_dir.path().join("secret.md");
        assert!(!resolver.exists(&absolute.to_string_lossy()));
    }

    #[test]
    fn test_memory_resolver() {
        let mut resolver = MemoryResolver::with_ids(["a.md", "b/c.md"]);
        assert!(resolver.exists("b/c.md"));
        assert_eq!(resolver.display_name("b/c.md"), "c");

        assert!(resolver.remove("a.md"));
        assert!(!resolver.exists("a.md"));

        resolver.insert("d.md");
        assert!(resolver.exists("d.md"));
    }
}
