//! Transfer Dispatcher: uploads resolved references in one backend call and
//! downloads remote references one by one.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::error::PipelineError;
use crate::reference::{Reference, ResolvedReference};
use crate::vault_path;

/// Extensions kept for downloaded files; anything else is saved as `jpg`.
const DOWNLOAD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];
const FALLBACK_EXTENSION: &str = "jpg";

static ILLEGAL_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("file name pattern is valid"));

/// Uploads every resolved reference in one call and returns the remote
/// locations in input order.
///
/// # Errors
///
/// - [`PipelineError::NothingToTransfer`] for an empty input.
/// - [`PipelineError::TransferBackend`] when the backend fails or reports failure.
/// - [`PipelineError::ResultCountMismatch`] when it answers with the wrong number of urls.
pub async fn upload(
    ctx: &ServiceContext,
    references: &[ResolvedReference],
) -> Result<Vec<String>, PipelineError> {
    if references.is_empty() {
        return Err(PipelineError::NothingToTransfer);
    }
    let items = references
        .iter()
        .map(|r| r.file.as_ref().map_or_else(|| r.path.clone(), |file| ctx.host_path(file)))
        .collect();
    upload_items(ctx, items).await
}

/// Uploads raw items (host paths or urls) in one call.
///
/// # Errors
///
/// Same as [`upload`], minus the empty-input check.
pub async fn upload_items(
    ctx: &ServiceContext,
    items: Vec<String>,
) -> Result<Vec<String>, PipelineError> {
    debug!(count = items.len(), "uploading");
    let response = ctx
        .transfer
        .upload_local(&items)
        .await
        .map_err(|e| PipelineError::TransferBackend(e.to_string()))?;

    if !response.success {
        let reason = response.message.unwrap_or_else(|| "upload failed".to_string());
        return Err(PipelineError::TransferBackend(reason));
    }
    if response.urls.len() != items.len() {
        return Err(PipelineError::ResultCountMismatch {
            expected: items.len(),
            actual: response.urls.len(),
        });
    }
    Ok(response.urls)
}

/// One remote image saved into the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedImage {
    /// The reference that pointed at the remote image.
    pub reference: Reference,
    /// Saved file name without extension; rendered as the display name.
    pub name: String,
    /// Saved file, relative to the document's folder.
    pub path: String,
}

/// Downloads each remote reference of the document at `document_path`.
///
/// Items fail independently. References sharing a url reuse the first
/// download of it.
pub async fn download(
    ctx: &ServiceContext,
    document_path: &str,
    references: &[Reference],
) -> Vec<Result<DownloadedImage, PipelineError>> {
    let folder = download_folder(&ctx.settings, document_path);
    let mut saved: HashMap<&str, Result<(String, String), PipelineError>> = HashMap::new();
    let mut results = Vec::with_capacity(references.len());

    for reference in references {
        if !saved.contains_key(reference.path.as_str()) {
            let outcome = download_one(ctx, &folder, &reference.path).await;
            if let Err(e) = &outcome {
                warn!(url = %reference.path, error = %e, "download failed");
            }
            saved.insert(reference.path.as_str(), outcome);
        }
        let result = match &saved[reference.path.as_str()] {
            Ok((name, saved_path)) => Ok(DownloadedImage {
                reference: reference.clone(),
                name: name.clone(),
                path: vault_path::relative_path(vault_path::parent_dir(document_path), saved_path),
            }),
            Err(e) => Err(e.clone()),
        };
        results.push(result);
    }
    results
}

/// Fetches one url and writes it into `folder`. Returns the display name
/// and the vault path of the saved file. A taken file name is swapped for
/// a fresh id; the display name stays the sanitized url stem.
async fn download_one(
    ctx: &ServiceContext,
    folder: &str,
    url: &str,
) -> Result<(String, String), PipelineError> {
    let response = ctx
        .transfer
        .fetch_remote(url)
        .await
        .map_err(|e| PipelineError::TransferBackend(e.to_string()))?;
    if response.status != 200 {
        return Err(PipelineError::TransferBackend(format!("{url} answered {}", response.status)));
    }

    let asset = url_asset(url);
    let ext = vault_path::extension(asset)
        .filter(|ext| DOWNLOAD_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    let name = file_name_for(asset);
    let mut stem = if name.is_empty() { ctx.id_gen.generate_id() } else { name.clone() };
    let mut path = vault_path::join_relative(folder, &format!("{stem}.{ext}"));
    if ctx.store.exists(&path) {
        stem = ctx.id_gen.generate_id();
        path = vault_path::join_relative(folder, &format!("{stem}.{ext}"));
    }

    ctx.store
        .write_binary(&path, &response.bytes)
        .map_err(|e| PipelineError::fs(&format!("write {path}"), e))?;
    debug!(url, path = %path, "downloaded");
    Ok((name, path))
}

/// Folder downloads are written to for the document at `document_path`.
#[must_use]
pub fn download_folder(settings: &Settings, document_path: &str) -> String {
    let folder = settings.attachment_folder.trim();
    if folder.starts_with("./") || folder == "." {
        vault_path::join_relative(vault_path::parent_dir(document_path), folder)
    } else {
        vault_path::normalize_path(folder)
    }
}

/// Last path segment of a url, without query or fragment.
fn url_asset(url: &str) -> &str {
    let tail = url.rsplit('/').next().unwrap_or(url);
    tail.split(['?', '#']).next().unwrap_or(tail)
}

/// Decoded file stem with characters illegal in file names replaced by `-`.
fn file_name_for(asset: &str) -> String {
    let stem = vault_path::decode_path(vault_path::file_stem(asset));
    ILLEGAL_FILE_CHARS.replace_all(&stem, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::VaultFile;
    use crate::testing::{rejected, test_context, uploaded, FakeTransfer, MemStore};

    fn remote(url: &str) -> Reference {
        Reference::new(format!("![]({url})"), url, "")
    }

    #[tokio::test]
    async fn upload_sends_host_paths_and_urls_in_order() {
        let store = MemStore::default();
        let transfer = FakeTransfer::default();
        let ctx = test_context(&store, &transfer, Settings::default());
        let refs = vec![
            ResolvedReference::bound(Reference::new("![](a.png)", "a.png", ""), VaultFile::from_path("img/a.png")),
            ResolvedReference::remote(remote("https://x.com/b.png")),
        ];

        let urls = upload(&ctx, &refs).await.unwrap();

        assert_eq!(urls, vec!["https://cdn.test/a.png", "https://cdn.test/b.png"]);
        let sent = &transfer.uploads()[0];
        assert!(sent[0].ends_with("img/a.png") && sent[0].starts_with("/vault"));
        assert_eq!(sent[1], "https://x.com/b.png");
    }

    #[tokio::test]
    async fn empty_upload_is_nothing_to_transfer() {
        let ctx = test_context(&MemStore::default(), &FakeTransfer::default(), Settings::default());
        assert_eq!(upload(&ctx, &[]).await, Err(PipelineError::NothingToTransfer));
    }

    #[tokio::test]
    async fn backend_failure_and_count_mismatch_are_errors() {
        let transfer = FakeTransfer::default();
        let ctx = test_context(&MemStore::default(), &transfer, Settings::default());
        let items = vec!["/vault/a.png".to_string(), "/vault/b.png".to_string()];

        transfer.script(Ok(rejected("quota exceeded")));
        assert_eq!(
            upload_items(&ctx, items.clone()).await,
            Err(PipelineError::TransferBackend("quota exceeded".into()))
        );

        transfer.script(Ok(uploaded(&["https://cdn.test/a.png"])));
        assert_eq!(
            upload_items(&ctx, items.clone()).await,
            Err(PipelineError::ResultCountMismatch { expected: 2, actual: 1 })
        );

        transfer.script(Err("connection refused".into()));
        assert!(matches!(
            upload_items(&ctx, items).await,
            Err(PipelineError::TransferBackend(msg)) if msg == "connection refused"
        ));
    }

    #[tokio::test]
    async fn download_saves_sanitized_name_relative_to_document() {
        let store = MemStore::default();
        let transfer = FakeTransfer::default();
        transfer.serve("https://x.com/p/my%20cat.png?s=1", 200, &[1, 2]);
        let ctx = test_context(&store, &transfer, Settings::default());

        let results = download(&ctx, "notes/doc.md", &[remote("https://x.com/p/my%20cat.png?s=1")]).await;

        let image = results[0].as_ref().unwrap();
        assert_eq!(image.name, "my cat");
        assert_eq!(image.path, "../attachments/my cat.png");
        assert_eq!(store.bytes("attachments/my cat.png"), Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn download_failures_do_not_stop_other_items() {
        let store = MemStore::default();
        let transfer = FakeTransfer::default();
        transfer.serve("https://x.com/ok.gif", 200, b"GIF");
        let ctx = test_context(&store, &transfer, Settings::default());

        let results =
            download(&ctx, "doc.md", &[remote("https://x.com/gone.png"), remote("https://x.com/ok.gif")]).await;

        assert!(matches!(&results[0], Err(PipelineError::TransferBackend(m)) if m.contains("404")));
        assert_eq!(results[1].as_ref().unwrap().path, "attachments/ok.gif");
    }

    #[tokio::test]
    async fn unknown_extension_falls_back_and_collisions_get_fresh_names() {
        let store = MemStore::with_files(&[("attachments/pic.jpg", "old")]);
        let transfer = FakeTransfer::default();
        transfer.serve("https://x.com/pic.php", 200, b"new");
        let ctx = test_context(&store, &transfer, Settings::default());

        let results = download(&ctx, "doc.md", &[remote("https://x.com/pic.php")]).await;

        let image = results[0].as_ref().unwrap();
        assert_eq!(image.path, "attachments/00001.jpg");
        assert_eq!(image.name, "pic");
        assert_eq!(store.text("attachments/pic.jpg"), "old");
        assert_eq!(store.text("attachments/00001.jpg"), "new");
        assert_eq!(
            crate::rewrite::rewrite_downloads("![](https://x.com/pic.php)", &[image.clone()], &ctx.settings),
            "![pic](attachments/00001.jpg)"
        );
    }

    #[tokio::test]
    async fn identical_urls_are_fetched_once() {
        let store = MemStore::default();
        let transfer = FakeTransfer::default();
        transfer.serve("https://x.com/a.png", 200, b"A");
        let ctx = test_context(&store, &transfer, Settings::default());
        let first = Reference::new("![one](https://x.com/a.png)", "https://x.com/a.png", "one");
        let second = Reference::new("![two](https://x.com/a.png)", "https://x.com/a.png", "two");

        let results = download(&ctx, "doc.md", &[first, second]).await;

        assert_eq!(transfer.fetched(), vec!["https://x.com/a.png"]);
        assert_eq!(results[0].as_ref().unwrap().path, results[1].as_ref().unwrap().path);
        assert_eq!(results[1].as_ref().unwrap().reference.name, "two");
    }

    #[test]
    fn document_relative_attachment_folder() {
        let mut settings = Settings::default();
        settings.attachment_folder = "./assets".into();
        assert_eq!(download_folder(&settings, "notes/doc.md"), "notes/assets");
        settings.attachment_folder = "media/img/".into();
        assert_eq!(download_folder(&settings, "notes/doc.md"), "media/img");
    }

    #[test]
    fn illegal_characters_are_replaced() {
        assert_eq!(file_name_for("a%3Ab*c.png"), "a-b-c");
        assert_eq!(url_asset("https://x.com/a/b.png#frag"), "b.png");
    }
}
