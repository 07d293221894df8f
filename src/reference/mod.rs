//! Image references: the typed records produced by extraction and resolution.

pub mod extract;

use serde::Serialize;

use crate::ports::VaultFile;
use crate::vault_path;

pub use extract::{extract_all, extract_bracket, extract_html, extract_wiki};

/// File extensions treated as images.
pub const IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "bmp", "gif", "svg", "tiff", "webp", "avif"];

/// One located image mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Exact original markup, used as the replace key.
    pub source: String,
    /// Local path or absolute URL as written.
    pub path: String,
    /// Display label.
    pub name: String,
}

impl Reference {
    /// Builds a reference from its three parts.
    pub fn new(source: impl Into<String>, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self { source: source.into(), path: path.into(), name: name.into() }
    }

    /// Returns `true` when the path is an `http(s)` URL.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        is_remote_path(&self.path)
    }
}

/// Returns `true` when `path` starts with `http://` or `https://` (any case).
#[must_use]
pub fn is_remote_path(path: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        path.get(..scheme.len()).is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Returns `true` when the path's extension is a recognized image type.
#[must_use]
pub fn is_image_path(path: &str) -> bool {
    vault_path::extension(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// A reference after resolution: remote, or bound to one vault file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReference {
    /// The reference as extracted.
    pub reference: Reference,
    /// Bound vault file; `None` for remote references.
    pub file: Option<VaultFile>,
    /// Normalized target: the vault path of the bound file, or the URL.
    pub path: String,
}

impl ResolvedReference {
    /// A remote reference, which passes resolution untouched.
    #[must_use]
    pub fn remote(reference: Reference) -> Self {
        let path = reference.path.clone();
        Self { reference, file: None, path }
    }

    /// A local reference bound to `file`.
    #[must_use]
    pub fn bound(reference: Reference, file: VaultFile) -> Self {
        let path = file.path.clone();
        Self { reference, file: Some(file), path }
    }
}
