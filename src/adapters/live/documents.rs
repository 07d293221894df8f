//! Live document store backed by a vault directory on disk.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::ports::documents::{DocumentStore, VaultFile};

/// Vault rooted at a directory; paths are resolved against that root.
pub struct LiveDocumentStore {
    root: PathBuf,
}

impl LiveDocumentStore {
    /// Creates a store for the vault at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path of a vault-relative path.
    #[must_use]
    pub fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> =
            rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
        Some(parts.join("/"))
    }
}

/// Dot-folders (`.git`, `.obsidian`, `.trash`) are never part of the vault.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

impl DocumentStore for LiveDocumentStore {
    fn read(&self, path: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(std::fs::read_to_string(self.full_path(path))?)
    }

    fn write(&self, path: &str, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write_binary(path, text.as_bytes())
    }

    fn write_binary(
        &self,
        path: &str,
        bytes: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(full, bytes)?)
    }

    fn list_files(&self) -> Result<Vec<VaultFile>, Box<dyn std::error::Error + Send + Sync>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).into_iter().filter_entry(|e| !is_hidden(e)) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(path) = self.relative(entry.path()) {
                files.push(VaultFile::from_path(path));
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn exists(&self, path: &str) -> bool {
        self.full_path(path).exists()
    }

    fn trash(&self, path: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        trash::delete(self.full_path(path))?;
        Ok(())
    }
}
