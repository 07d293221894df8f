//! Document store port for vault file access.

use serde::{Deserialize, Serialize};

/// One file known to the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultFile {
    /// Vault-relative path using `/` separators (e.g. `notes/img/a.png`).
    pub path: String,
    /// File name including its extension (e.g. `a.png`).
    pub name: String,
}

impl VaultFile {
    /// Builds a file entry from a vault-relative path.
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Self { path, name }
    }
}

/// Reads and writes documents and assets inside one vault.
///
/// All paths are vault-relative with `/` separators, so the core never
/// sees host-specific path syntax.
pub trait DocumentStore: Send + Sync {
    /// Reads a document as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read(&self, path: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Replaces a document's text, creating parent folders as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn write(&self, path: &str, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Writes raw bytes (a downloaded asset), creating parent folders as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn write_binary(
        &self,
        path: &str,
        bytes: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Lists every file in the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault cannot be walked.
    fn list_files(&self) -> Result<Vec<VaultFile>, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns `true` if a file or folder exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Moves a file to the trash.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be trashed.
    fn trash(&self, path: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
