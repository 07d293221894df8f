//! Batch Orchestrator: runs the upload or download pipeline over every
//! markdown document directly inside a folder, one document at a time.

use tracing::{info, warn};

use crate::context::ServiceContext;
use crate::dispatch;
use crate::error::PipelineError;
use crate::filter::select_candidates;
use crate::ports::{DocumentStore, Editor, VaultFile};
use crate::reference::{extract_all, Reference};
use crate::resolve::{resolve_all, FileIndex};
use crate::rewrite::{rewrite, rewrite_downloads, trash_sources};
use crate::vault_path;

/// What happened to one document of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Nothing to transfer.
    Skipped,
    /// References relinked; `failed` counts per-item download failures.
    Transferred {
        /// References relinked.
        count: usize,
        /// Items that could not be transferred.
        failed: usize,
    },
    /// The document could not be processed.
    Failed(String),
}

/// One document's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    /// Vault path of the document.
    pub path: String,
    /// Outcome.
    pub status: DocumentStatus,
}

/// Totals for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Markdown documents found in the folder.
    pub documents: usize,
    /// Documents visited, including failed ones.
    pub processed: usize,
    /// Image references considered for transfer.
    pub images: usize,
    /// References relinked.
    pub succeeded: usize,
    /// Per-document outcomes in processing order.
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchSummary {
    fn record(&mut self, path: &str, result: Result<DocumentStatus, PipelineError>) {
        self.processed += 1;
        let status = match result {
            Ok(status) => {
                if let DocumentStatus::Transferred { count, .. } = status {
                    self.succeeded += count;
                }
                status
            }
            Err(e) => {
                warn!(document = path, error = %e, "document failed");
                DocumentStatus::Failed(e.to_string())
            }
        };
        self.outcomes.push(DocumentOutcome { path: path.to_string(), status });
    }
}

/// Markdown documents directly inside `folder` (not in subfolders), sorted.
///
/// # Errors
///
/// Returns [`PipelineError::FileSystem`] when the vault cannot be listed.
pub fn folder_documents(store: &dyn DocumentStore, folder: &str) -> Result<Vec<String>, PipelineError> {
    let files = store.list_files().map_err(|e| PipelineError::fs("list vault files", e))?;
    Ok(documents_in(&files, folder))
}

fn documents_in<'a>(files: impl IntoIterator<Item = &'a VaultFile>, folder: &str) -> Vec<String> {
    let folder = vault_path::normalize_path(folder);
    let mut documents: Vec<String> = files
        .into_iter()
        .filter(|f| vault_path::parent_dir(&f.path) == folder)
        .filter(|f| vault_path::extension(&f.path).as_deref() == Some("md"))
        .map(|f| f.path.clone())
        .collect();
    documents.sort();
    documents
}

fn read(ctx: &ServiceContext, path: &str) -> Result<String, PipelineError> {
    ctx.store.read(path).map_err(|e| PipelineError::fs(&format!("read {path}"), e))
}

fn write(ctx: &ServiceContext, path: &str, text: &str) -> Result<(), PipelineError> {
    ctx.store.write(path, text).map_err(|e| PipelineError::fs(&format!("write {path}"), e))
}

/// Uploads the images of every document in `folder`.
///
/// When `focus` is given, each document is opened in it while processed
/// and the document open before the batch is reopened afterwards.
///
/// # Errors
///
/// Returns an error only when the folder cannot be listed; per-document
/// failures are recorded in the summary.
pub async fn batch_upload(
    ctx: &ServiceContext,
    folder: &str,
    focus: Option<&dyn Editor>,
) -> Result<BatchSummary, PipelineError> {
    let mut index = FileIndex::from_store(ctx.store.as_ref())?;
    let documents = documents_in(index.files(), folder);
    let previous = focus.and_then(Editor::document_path);
    let mut summary = BatchSummary { documents: documents.len(), ..BatchSummary::default() };

    for path in &documents {
        let result = match upload_candidates(ctx, path, focus) {
            Ok(candidates) => {
                summary.images += candidates.len();
                upload_one(ctx, path, candidates, &mut index).await
            }
            Err(e) => Err(e),
        };
        summary.record(path, result);
    }

    if let (Some(editor), Some(path)) = (focus, previous) {
        match read(ctx, &path) {
            Ok(text) => editor.open_document(&path, &text),
            Err(e) => warn!(document = %path, error = %e, "could not reopen document"),
        }
    }
    info!(
        documents = summary.documents,
        images = summary.images,
        succeeded = summary.succeeded,
        "batch upload finished"
    );
    Ok(summary)
}

fn upload_candidates(
    ctx: &ServiceContext,
    path: &str,
    focus: Option<&dyn Editor>,
) -> Result<Vec<Reference>, PipelineError> {
    let text = read(ctx, path)?;
    if let Some(editor) = focus {
        editor.open_document(path, &text);
    }
    Ok(select_candidates(extract_all(&text), &ctx.settings))
}

/// Uploads one document against the batch-wide `index`. Trashed sources
/// are dropped from the index so later documents do not bind to them.
async fn upload_one(
    ctx: &ServiceContext,
    path: &str,
    candidates: Vec<Reference>,
    index: &mut FileIndex,
) -> Result<DocumentStatus, PipelineError> {
    if candidates.is_empty() {
        return Ok(DocumentStatus::Skipped);
    }
    let resolved = resolve_all(candidates, path, index).resolved;
    if resolved.is_empty() {
        return Ok(DocumentStatus::Skipped);
    }

    let urls = dispatch::upload(ctx, &resolved).await?;
    let updated = rewrite(&read(ctx, path)?, &resolved, &urls, &ctx.settings)?;
    write(ctx, path, &updated)?;
    if trash_sources(ctx, &resolved) > 0 {
        for file in resolved.iter().filter_map(|r| r.file.as_ref()) {
            if !ctx.store.exists(&file.path) {
                index.forget(&file.path);
            }
        }
    }
    info!(document = path, uploaded = resolved.len(), "uploaded");
    Ok(DocumentStatus::Transferred { count: resolved.len(), failed: 0 })
}

/// Downloads the remote images of every document in `folder`.
///
/// # Errors
///
/// Returns an error only when the folder cannot be listed.
pub async fn batch_download(ctx: &ServiceContext, folder: &str) -> Result<BatchSummary, PipelineError> {
    let documents = folder_documents(ctx.store.as_ref(), folder)?;
    let mut summary = BatchSummary { documents: documents.len(), ..BatchSummary::default() };

    for path in &documents {
        let result = match read(ctx, path) {
            Ok(text) => {
                let remote: Vec<Reference> =
                    extract_all(&text).into_iter().filter(Reference::is_remote).collect();
                summary.images += remote.len();
                download_one(ctx, path, &text, &remote).await
            }
            Err(e) => Err(e),
        };
        summary.record(path, result);
    }
    info!(
        documents = summary.documents,
        images = summary.images,
        succeeded = summary.succeeded,
        "batch download finished"
    );
    Ok(summary)
}

async fn download_one(
    ctx: &ServiceContext,
    path: &str,
    text: &str,
    remote: &[Reference],
) -> Result<DocumentStatus, PipelineError> {
    if remote.is_empty() {
        return Ok(DocumentStatus::Skipped);
    }

    let results = dispatch::download(ctx, path, remote).await;
    let failed = results.iter().filter(|r| r.is_err()).count();
    let saved: Vec<_> = results.into_iter().filter_map(Result::ok).collect();
    if !saved.is_empty() {
        write(ctx, path, &rewrite_downloads(text, &saved, &ctx.settings))?;
    }
    info!(document = path, downloaded = saved.len(), failed, "downloaded");
    Ok(DocumentStatus::Transferred { count: saved.len(), failed })
}
