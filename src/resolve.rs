//! Path Resolver: binds local references to vault files.
//!
//! Tiers, first match wins: exact vault path, then `./` or `../` relative
//! to the document's folder, then bare file name. The name tier picks
//! whichever file with that name was listed last when names collide.

use std::collections::HashMap;

use tracing::debug;

use crate::error::PipelineError;
use crate::ports::{DocumentStore, VaultFile};
use crate::reference::{is_image_path, Reference, ResolvedReference};
use crate::vault_path;

/// Lookup tables over every file in the vault.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    by_path: HashMap<String, VaultFile>,
    by_name: HashMap<String, VaultFile>,
}

impl FileIndex {
    /// Indexes `files` by full path and by file name.
    #[must_use]
    pub fn new(files: impl IntoIterator<Item = VaultFile>) -> Self {
        let mut index = Self::default();
        for file in files {
            index.by_name.insert(file.name.clone(), file.clone());
            index.by_path.insert(file.path.clone(), file);
        }
        index
    }

    /// Indexes every file the store lists.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::FileSystem`] when the listing fails.
    pub fn from_store(store: &dyn DocumentStore) -> Result<Self, PipelineError> {
        let files = store.list_files().map_err(|e| PipelineError::fs("list vault files", e))?;
        Ok(Self::new(files))
    }

    /// Every indexed file, in no particular order.
    pub fn files(&self) -> impl Iterator<Item = &VaultFile> {
        self.by_path.values()
    }

    /// Drops a file that no longer exists.
    pub fn forget(&mut self, path: &str) {
        if let Some(file) = self.by_path.remove(path) {
            if self.by_name.get(&file.name).is_some_and(|named| named.path == path) {
                self.by_name.remove(&file.name);
            }
        }
    }

    fn by_path(&self, path: &str) -> Option<&VaultFile> {
        self.by_path.get(path)
    }

    fn by_name(&self, name: &str) -> Option<&VaultFile> {
        self.by_name.get(name)
    }
}

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// URL; nothing to bind.
    Remote,
    /// Bound to an image file in the vault.
    Bound(VaultFile),
    /// No image file matched.
    Unresolved,
}

/// Resolves one reference made in the document at `document_path`.
#[must_use]
pub fn resolve(reference: &Reference, document_path: &str, index: &FileIndex) -> Resolution {
    if reference.is_remote() {
        return Resolution::Remote;
    }
    let decoded = vault_path::decode_path(&reference.path);

    let relative = || {
        (decoded.starts_with("./") || decoded.starts_with("../")).then(|| {
            vault_path::join_relative(vault_path::parent_dir(document_path), &decoded)
        })
    };

    let found = index
        .by_path(&decoded)
        .or_else(|| relative().and_then(|path| index.by_path(&path)))
        .or_else(|| index.by_name(vault_path::file_name(&decoded)));

    match found {
        Some(file) if is_image_path(&file.path) => Resolution::Bound(file.clone()),
        Some(file) => {
            debug!(path = %reference.path, file = %file.path, "reference resolved to a non-image file");
            Resolution::Unresolved
        }
        None => {
            debug!(path = %reference.path, document = document_path, "reference not found in vault");
            Resolution::Unresolved
        }
    }
}

/// Resolved references plus those left unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Remote and bound references, in input order.
    pub resolved: Vec<ResolvedReference>,
    /// Local references with no matching image file.
    pub unresolved: Vec<Reference>,
}

/// Resolves every reference; unresolved ones are set aside.
#[must_use]
pub fn resolve_all(references: Vec<Reference>, document_path: &str, index: &FileIndex) -> ResolveReport {
    let mut report = ResolveReport::default();
    for reference in references {
        match resolve(&reference, document_path, index) {
            Resolution::Remote => report.resolved.push(ResolvedReference::remote(reference)),
            Resolution::Bound(file) => report.resolved.push(ResolvedReference::bound(reference, file)),
            Resolution::Unresolved => report.unresolved.push(reference),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(paths: &[&str]) -> FileIndex {
        FileIndex::new(paths.iter().map(|p| VaultFile::from_path(*p)))
    }

    fn local(path: &str) -> Reference {
        Reference::new(format!("![]({path})"), path, "")
    }

    fn bound(path: &str) -> Resolution {
        Resolution::Bound(VaultFile::from_path(path))
    }

    #[test]
    fn exact_path_wins_over_name_fallback() {
        let idx = index(&["img/a.png", "other/a.png"]);
        assert_eq!(resolve(&local("img/a.png"), "notes/doc.md", &idx), bound("img/a.png"));
    }

    #[test]
    fn relative_path_wins_over_name_fallback() {
        let idx = index(&["notes/img/a.png", "zzz/a.png"]);
        assert_eq!(resolve(&local("./img/a.png"), "notes/doc.md", &idx), bound("notes/img/a.png"));

        let idx = index(&["shared/a.png", "zzz/a.png"]);
        assert_eq!(resolve(&local("../shared/a.png"), "notes/doc.md", &idx), bound("shared/a.png"));
    }

    #[test]
    fn bare_name_falls_back_to_name_index() {
        let idx = index(&["deep/folder/a.png"]);
        assert_eq!(resolve(&local("a.png"), "doc.md", &idx), bound("deep/folder/a.png"));
        assert_eq!(resolve(&local("elsewhere/a.png"), "doc.md", &idx), bound("deep/folder/a.png"));
    }

    #[test]
    fn duplicate_names_resolve_to_the_last_listed() {
        let idx = index(&["x/a.png", "y/a.png"]);
        assert_eq!(resolve(&local("a.png"), "doc.md", &idx), bound("y/a.png"));
    }

    #[test]
    fn percent_encoded_paths_are_decoded() {
        let idx = index(&["img/a b.png"]);
        assert_eq!(resolve(&local("img/a%20b.png"), "doc.md", &idx), bound("img/a b.png"));
    }

    #[test]
    fn non_image_and_missing_files_are_unresolved() {
        let idx = index(&["docs/a.pdf"]);
        assert_eq!(resolve(&local("docs/a.pdf"), "doc.md", &idx), Resolution::Unresolved);
        assert_eq!(resolve(&local("nope.png"), "doc.md", &idx), Resolution::Unresolved);
    }

    #[test]
    fn remote_references_pass_through() {
        let idx = index(&[]);
        let r = Reference::new("![](https://x.com/a.png)", "https://x.com/a.png", "");
        assert_eq!(resolve(&r, "doc.md", &idx), Resolution::Remote);
    }

    #[test]
    fn resolve_all_splits_resolved_from_unresolved() {
        let idx = index(&["a.png"]);
        let remote = Reference::new("![](https://x.com/b.png)", "https://x.com/b.png", "");
        let report = resolve_all(vec![local("a.png"), local("missing.png"), remote], "doc.md", &idx);

        assert_eq!(report.resolved.len(), 2);
        assert_eq!(report.resolved[0].path, "a.png");
        assert!(report.resolved[0].file.is_some());
        assert_eq!(report.resolved[1].file, None);
        assert_eq!(report.unresolved, vec![local("missing.png")]);
    }
}
