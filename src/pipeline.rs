//! Single-document flows over the open editor: upload every image, upload
//! one file, download every remote image.

use tracing::info;

use crate::context::ServiceContext;
use crate::dispatch;
use crate::error::PipelineError;
use crate::filter::select_candidates;
use crate::ports::{Editor, VaultFile};
use crate::reference::{extract_all, is_image_path, Reference, ResolvedReference};
use crate::resolve::{resolve, resolve_all, FileIndex, Resolution};
use crate::rewrite::{rewrite, rewrite_downloads, trash_sources};
use crate::vault_path;

/// Counts for one uploaded document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// References relinked to their uploaded location.
    pub uploaded: usize,
    /// Local references with no image file behind them.
    pub unresolved: usize,
    /// Source files moved to the trash afterwards.
    pub trashed: usize,
}

/// Counts for one downloaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// References relinked to a saved file.
    pub downloaded: usize,
    /// Urls that could not be saved, with the reason.
    pub failed: Vec<(String, String)>,
}

fn active_document(editor: &dyn Editor) -> Result<String, PipelineError> {
    editor.document_path().ok_or(PipelineError::NoActiveDocument)
}

/// Fails when the editor switched documents while a transfer was running.
fn ensure_same_document(editor: &dyn Editor, expected: &str) -> Result<(), PipelineError> {
    let actual = editor.document_path().unwrap_or_default();
    if actual == expected {
        Ok(())
    } else {
        Err(PipelineError::DocumentContextChanged { expected: expected.to_string(), actual })
    }
}

/// Every reference in a stored document with its resolution.
///
/// # Errors
///
/// Returns [`PipelineError::FileSystem`] when the document or the vault
/// listing cannot be read.
pub fn inspect_document(
    ctx: &ServiceContext,
    document_path: &str,
) -> Result<Vec<(Reference, Resolution)>, PipelineError> {
    let text = ctx
        .store
        .read(document_path)
        .map_err(|e| PipelineError::fs(&format!("read {document_path}"), e))?;
    let index = FileIndex::from_store(ctx.store.as_ref())?;
    Ok(extract_all(&text)
        .into_iter()
        .map(|r| {
            let resolution = resolve(&r, document_path, &index);
            (r, resolution)
        })
        .collect())
}

/// Uploads every eligible image of the open document and relinks it.
///
/// # Errors
///
/// - [`PipelineError::NoActiveDocument`] when nothing is open.
/// - [`PipelineError::NothingToTransfer`] when no reference resolves.
/// - Upload errors from [`dispatch::upload`]; the document is left as it was.
/// - [`PipelineError::DocumentContextChanged`] when the editor switched
///   documents before the upload settled.
pub async fn upload_document(
    ctx: &ServiceContext,
    editor: &dyn Editor,
) -> Result<UploadReport, PipelineError> {
    let document = active_document(editor)?;
    let candidates = select_candidates(extract_all(&editor.get_value()), &ctx.settings);
    let index = FileIndex::from_store(ctx.store.as_ref())?;
    let report = resolve_all(candidates, &document, &index);
    if report.resolved.is_empty() {
        return Err(PipelineError::NothingToTransfer);
    }
    info!(document = %document, images = report.resolved.len(), "found images");

    let urls = dispatch::upload(ctx, &report.resolved).await?;
    ensure_same_document(editor, &document)?;
    let updated = rewrite(&editor.get_value(), &report.resolved, &urls, &ctx.settings)?;
    editor.set_value(&updated);

    Ok(UploadReport {
        uploaded: report.resolved.len(),
        unresolved: report.unresolved.len(),
        trashed: trash_sources(ctx, &report.resolved),
    })
}

/// Uploads one vault image and relinks every reference to it in the open
/// document. References match on their decoded file name.
///
/// # Errors
///
/// Same as [`upload_document`]; [`PipelineError::NothingToTransfer`] also
/// when `file` is not an image.
pub async fn upload_single_file(
    ctx: &ServiceContext,
    editor: &dyn Editor,
    file: &VaultFile,
) -> Result<UploadReport, PipelineError> {
    let document = active_document(editor)?;
    if !is_image_path(&file.path) {
        return Err(PipelineError::NothingToTransfer);
    }
    let matching: Vec<ResolvedReference> = extract_all(&editor.get_value())
        .into_iter()
        .filter(|r| vault_path::file_name(&vault_path::decode_path(&r.path)) == file.name)
        .map(|r| ResolvedReference::bound(r, file.clone()))
        .collect();
    if matching.is_empty() {
        return Err(PipelineError::NothingToTransfer);
    }

    let urls = dispatch::upload(ctx, &matching).await?;
    ensure_same_document(editor, &document)?;
    let updated = rewrite(&editor.get_value(), &matching, &urls, &ctx.settings)?;
    editor.set_value(&updated);

    Ok(UploadReport { uploaded: matching.len(), unresolved: 0, trashed: trash_sources(ctx, &matching) })
}

/// Downloads every remote image of the open document into the vault and
/// relinks the ones that were saved.
///
/// # Errors
///
/// - [`PipelineError::NoActiveDocument`] when nothing is open.
/// - [`PipelineError::NothingToTransfer`] when the document has no remote image.
/// - [`PipelineError::DocumentContextChanged`] when the editor switched documents.
pub async fn download_document(
    ctx: &ServiceContext,
    editor: &dyn Editor,
) -> Result<DownloadReport, PipelineError> {
    let document = active_document(editor)?;
    let remote: Vec<Reference> =
        extract_all(&editor.get_value()).into_iter().filter(Reference::is_remote).collect();
    if remote.is_empty() {
        return Err(PipelineError::NothingToTransfer);
    }

    let mut report = DownloadReport::default();
    let mut saved = Vec::new();
    for (reference, result) in remote.iter().zip(dispatch::download(ctx, &document, &remote).await) {
        match result {
            Ok(image) => saved.push(image),
            Err(e) => report.failed.push((reference.path.clone(), e.to_string())),
        }
    }
    if saved.is_empty() {
        return Ok(report);
    }

    ensure_same_document(editor, &document)?;
    editor.set_value(&rewrite_downloads(&editor.get_value(), &saved, &ctx.settings));
    report.downloaded = saved.len();
    info!(document = %document, downloaded = report.downloaded, "downloaded images");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::BufferEditor;
    use crate::config::Settings;
    use crate::testing::{rejected, test_context, uploaded, FakeTransfer, MemStore};

    const DOC: &str = "notes/doc.md";

    fn open(text: &str) -> BufferEditor {
        BufferEditor::new(DOC, text)
    }

    #[tokio::test]
    async fn uploads_resolved_images_and_relinks_them() {
        let store = MemStore::with_files(&[("notes/img/a.png", "A"), ("b.jpg", "B")]);
        let transfer = FakeTransfer::default();
        let ctx = test_context(&store, &transfer, Settings::default());
        let editor = open("![a](./img/a.png)\n![[b.jpg]]\n![gone](missing.png)\n![r](https://x.com/r.png)");

        let report = upload_document(&ctx, &editor).await.unwrap();

        assert_eq!(report, UploadReport { uploaded: 2, unresolved: 1, trashed: 0 });
        assert_eq!(
            editor.get_value(),
            "![a](https://cdn.test/a.png)\n![b](https://cdn.test/b.jpg)\n![gone](missing.png)\n![r](https://x.com/r.png)"
        );
    }

    #[tokio::test]
    async fn nothing_resolved_is_reported_without_uploading() {
        let transfer = FakeTransfer::default();
        let ctx = test_context(&MemStore::default(), &transfer, Settings::default());
        let editor = open("![a](missing.png)");

        assert_eq!(upload_document(&ctx, &editor).await, Err(PipelineError::NothingToTransfer));
        assert!(transfer.uploads().is_empty());
    }

    #[tokio::test]
    async fn failed_or_mismatched_upload_leaves_the_document_unchanged() {
        let store = MemStore::with_files(&[("a.png", "A"), ("b.png", "B")]);
        let transfer = FakeTransfer::default();
        let ctx = test_context(&store, &transfer, Settings { delete_source: true, ..Settings::default() });
        let text = "![](a.png) ![](b.png)";
        let editor = open(text);

        transfer.script(Ok(uploaded(&["https://cdn/a.png"])));
        assert_eq!(
            upload_document(&ctx, &editor).await,
            Err(PipelineError::ResultCountMismatch { expected: 2, actual: 1 })
        );
        assert_eq!(editor.get_value(), text);

        transfer.script(Ok(rejected("nope")));
        assert!(upload_document(&ctx, &editor).await.is_err());
        assert_eq!(editor.get_value(), text);
        assert!(store.trashed().is_empty());
    }

    #[tokio::test]
    async fn switching_documents_mid_upload_discards_the_result() {
        let store = MemStore::with_files(&[("a.png", "A")]);
        let transfer = FakeTransfer::default();
        let gate = transfer.gate();
        let ctx = test_context(&store, &transfer, Settings::default());
        let editor = open("![](a.png)");

        let upload = upload_document(&ctx, &editor);
        let switch = async {
            tokio::task::yield_now().await;
            editor.open_document("other.md", "other");
            gate.send(Ok(uploaded(&["https://cdn/a.png"]))).unwrap();
        };
        let (result, ()) = futures::join!(upload, switch);

        assert_eq!(
            result,
            Err(PipelineError::DocumentContextChanged { expected: DOC.into(), actual: "other.md".into() })
        );
        assert_eq!(editor.get_value(), "other");
    }

    #[tokio::test]
    async fn delete_source_trashes_uploaded_files() {
        let store = MemStore::with_files(&[("a.png", "A")]);
        let ctx = test_context(&store, &FakeTransfer::default(), Settings { delete_source: true, ..Settings::default() });
        let editor = open("![](a.png)");

        let report = upload_document(&ctx, &editor).await.unwrap();

        assert_eq!(report.trashed, 1);
        assert_eq!(store.trashed(), vec!["a.png"]);
    }

    #[tokio::test]
    async fn no_active_document_is_an_error() {
        let ctx = test_context(&MemStore::default(), &FakeTransfer::default(), Settings::default());
        let editor = BufferEditor::default();
        assert_eq!(upload_document(&ctx, &editor).await, Err(PipelineError::NoActiveDocument));
    }

    #[tokio::test]
    async fn single_file_upload_relinks_matching_names_only() {
        let store = MemStore::with_files(&[("img/a b.png", "A")]);
        let transfer = FakeTransfer::default();
        let ctx = test_context(&store, &transfer, Settings::default());
        let editor = open("![x](img/a%20b.png) ![y](<other/a b.png>) ![z](c.png)");

        let report = upload_single_file(&ctx, &editor, &VaultFile::from_path("img/a b.png")).await.unwrap();

        assert_eq!(report.uploaded, 2);
        assert_eq!(transfer.uploads()[0].len(), 2);
        assert_eq!(
            editor.get_value(),
            "![x](https://cdn.test/a b.png) ![y](https://cdn.test/a b.png) ![z](c.png)"
        );
    }

    #[tokio::test]
    async fn download_document_relinks_saved_images_and_reports_failures() {
        let store = MemStore::default();
        let transfer = FakeTransfer::default();
        transfer.serve("https://x.com/a.png", 200, b"A");
        let ctx = test_context(&store, &transfer, Settings::default());
        let editor = open("![a](https://x.com/a.png)\n![b](https://x.com/b.png)\n![l](local.png)");

        let report = download_document(&ctx, &editor).await.unwrap();

        assert_eq!(report.downloaded, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "https://x.com/b.png");
        assert_eq!(
            editor.get_value(),
            "![a](../attachments/a.png)\n![b](https://x.com/b.png)\n![l](local.png)"
        );
        assert_eq!(store.text("attachments/a.png"), "A");
    }

    #[test]
    fn inspect_lists_every_reference_with_its_resolution() {
        let store = MemStore::with_files(&[(DOC, "![](a.png) ![](https://x.com/b.png) ![](c.png)"), ("a.png", "A")]);
        let ctx = test_context(&store, &FakeTransfer::default(), Settings::default());

        let found = inspect_document(&ctx, DOC).unwrap();

        let resolutions: Vec<&Resolution> = found.iter().map(|(_, r)| r).collect();
        assert_eq!(
            resolutions,
            [&Resolution::Bound(VaultFile::from_path("a.png")), &Resolution::Remote, &Resolution::Unresolved]
        );
    }
}
