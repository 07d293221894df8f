//! Interactive Session Manager: paste and drop uploads anchored by
//! placeholder markup.
//!
//! Each operation inserts `![Uploading file...<token>]()` at the cursor
//! before anything is sent, then replaces the first occurrence of that
//! exact placeholder once the upload settles. Tokens are unique per
//! document, so overlapping sessions never touch each other's placeholder.
//! Edits are read-modify-write on the editor's current text; two writers
//! to the same document can still lose one another's change.

use std::future::Future;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::dispatch;
use crate::error::PipelineError;
use crate::filter;
use crate::frontmatter::frontmatter_value;
use crate::ports::editor::{Editor, Position};
use crate::reference::{extract_all, is_image_path, ResolvedReference};
use crate::rewrite::{display_name, render_markup, rewrite};
use crate::vault_path;

/// Text left in place of a placeholder whose upload failed.
pub const FAILURE_MARKER: &str = "⚠️upload failed, check dev console";

/// Front matter key overriding `upload_by_clip_switch` per document.
pub const AUTO_UPLOAD_KEY: &str = "image-auto-upload";

const TOKEN_LEN: usize = 5;
const TOKEN_ATTEMPTS: usize = 8;

/// Short id anchoring one in-flight upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderToken(String);

impl PlaceholderToken {
    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder markup embedding this token.
    #[must_use]
    pub fn markup(&self) -> String {
        placeholder_for(&self.0)
    }
}

/// `![Uploading file...<token>]()`.
#[must_use]
pub fn placeholder_for(token: &str) -> String {
    format!("![Uploading file...{token}]()")
}

/// A placeholder inserted in the editor and not yet settled.
#[derive(Debug)]
#[must_use = "a pending placeholder stays in the document until settled"]
pub struct PendingPlaceholder {
    token: PlaceholderToken,
}

impl PendingPlaceholder {
    /// Token of this placeholder.
    pub fn token(&self) -> &PlaceholderToken {
        &self.token
    }
}

/// How an upload ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Uploaded to `url`; `name` is the original file name.
    Success {
        /// Remote location.
        url: String,
        /// Display name before the naming policy applies.
        name: String,
    },
    /// Upload failed.
    Failure {
        /// Human-readable reason.
        reason: String,
    },
}

/// What the clipboard carried at paste time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardContent {
    /// Host paths of pasted files.
    pub files: Vec<String>,
    /// Plain text on the clipboard.
    pub text: String,
}

/// Result of one paste event.
#[derive(Debug, Default)]
pub struct PasteOutcome {
    /// Auto-upload was switched off for this document.
    pub disabled: bool,
    /// Remote references from the pasted text that were re-uploaded.
    pub relinked: usize,
    /// One entry per pasted file session, in clipboard order.
    pub uploads: Vec<Result<String, PipelineError>>,
}

/// Returns `true` when paste/drop auto-upload is on for the document text.
#[must_use]
pub fn auto_upload_enabled(document_text: &str, settings: &Settings) -> bool {
    frontmatter_value::<bool>(document_text, AUTO_UPLOAD_KEY).unwrap_or(settings.upload_by_clip_switch)
}

/// Returns `true` when a paste should be handled as an image upload: the
/// first file is an image and there is either no text or `apply_image` is on.
#[must_use]
pub fn can_upload(clipboard: &ClipboardContent, settings: &Settings) -> bool {
    let has_image = clipboard.files.first().is_some_and(|f| is_image_path(f));
    has_image && (clipboard.text.is_empty() || settings.apply_image)
}

/// Replaces the first occurrence of `target` in the editor. Returns `false`
/// when it is gone.
pub fn replace_first_occurrence(editor: &dyn Editor, target: &str, replacement: &str) -> bool {
    let text = editor.get_value();
    for (line, content) in text.split('\n').enumerate() {
        if let Some(ch) = content.find(target) {
            editor.replace_range(
                replacement,
                Position::new(line, ch),
                Position::new(line, ch + target.len()),
            );
            return true;
        }
    }
    false
}

/// Runs paste and drop sessions against one editor.
#[derive(Clone, Copy)]
pub struct SessionManager<'a> {
    ctx: &'a ServiceContext,
    editor: &'a dyn Editor,
}

impl<'a> SessionManager<'a> {
    /// Creates a manager for the document open in `editor`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, editor: &'a dyn Editor) -> Self {
        Self { ctx, editor }
    }

    fn fresh_token(&self) -> PlaceholderToken {
        let text = self.editor.get_value();
        let mut id = String::new();
        for _ in 0..TOKEN_ATTEMPTS {
            id = self.ctx.id_gen.generate_id();
            let token: String = id.chars().take(TOKEN_LEN).collect();
            if !text.contains(&placeholder_for(&token)) {
                return PlaceholderToken(token);
            }
            debug!(token, "placeholder token already in document, regenerating");
        }
        PlaceholderToken(id)
    }

    /// Inserts a placeholder line at the cursor.
    pub fn insert_placeholder(&self) -> PendingPlaceholder {
        let token = self.fresh_token();
        self.editor.replace_selection(&format!("{}\n", token.markup()));
        PendingPlaceholder { token }
    }

    /// Replaces the placeholder with final markup or the failure marker.
    /// Returns `false` when the placeholder was removed in the meantime.
    pub fn settle(&self, pending: PendingPlaceholder, settlement: &Settlement) -> bool {
        let replacement = match settlement {
            Settlement::Success { url, name } => {
                render_markup(&display_name(name, &self.ctx.settings), url)
            }
            Settlement::Failure { .. } => FAILURE_MARKER.to_string(),
        };
        let replaced = replace_first_occurrence(self.editor, &pending.token.markup(), &replacement);
        if !replaced {
            debug!(token = pending.token.as_str(), "placeholder no longer in document");
        }
        replaced
    }

    /// Starts one paste upload of the host file `file`.
    ///
    /// The placeholder is inserted before this returns; the returned future
    /// uploads and settles it.
    pub fn paste_file(&self, file: String) -> impl Future<Output = Result<String, PipelineError>> + 'a {
        let pending = self.insert_placeholder();
        let manager = *self;
        async move {
            let name = vault_path::file_name(&file).to_string();
            let result = dispatch::upload_items(manager.ctx, vec![file])
                .await
                .and_then(|urls| {
                    urls.into_iter()
                        .next()
                        .ok_or(PipelineError::ResultCountMismatch { expected: 1, actual: 0 })
                });
            match result {
                Ok(url) => {
                    manager.settle(pending, &Settlement::Success { url: url.clone(), name });
                    Ok(url)
                }
                Err(e) => {
                    warn!(error = %e, "paste upload failed");
                    manager.settle(pending, &Settlement::Failure { reason: e.to_string() });
                    Err(e)
                }
            }
        }
    }

    /// Starts a drop of several host files: one placeholder each, one
    /// upload call for all of them.
    ///
    /// Nothing happens when auto-upload is off or the first file is not an
    /// image; the future then yields an empty list.
    pub fn drop_files(
        &self,
        files: Vec<String>,
    ) -> impl Future<Output = Result<Vec<String>, PipelineError>> + 'a {
        let enabled = auto_upload_enabled(&self.editor.get_value(), &self.ctx.settings)
            && files.first().is_some_and(|f| is_image_path(f));
        let pending: Vec<PendingPlaceholder> = if enabled {
            files.iter().map(|_| self.insert_placeholder()).collect()
        } else {
            Vec::new()
        };
        let manager = *self;
        async move {
            if !enabled {
                debug!("drop ignored");
                return Ok(Vec::new());
            }
            let names: Vec<String> =
                files.iter().map(|f| vault_path::file_name(f).to_string()).collect();
            match dispatch::upload_items(manager.ctx, files).await {
                Ok(urls) => {
                    for ((pending, url), name) in pending.into_iter().zip(&urls).zip(names) {
                        manager.settle(pending, &Settlement::Success { url: url.clone(), name });
                    }
                    Ok(urls)
                }
                Err(e) => {
                    warn!(error = %e, "drop upload failed");
                    let failure = Settlement::Failure { reason: e.to_string() };
                    for pending in pending {
                        manager.settle(pending, &failure);
                    }
                    Err(e)
                }
            }
        }
    }

    /// Re-uploads the remote images of pasted text and relinks them in the
    /// document. Does nothing unless `work_on_network` is on.
    ///
    /// # Errors
    ///
    /// Returns the upload error; the document is left as it was.
    pub async fn relink_pasted_text(&self, text: &str) -> Result<usize, PipelineError> {
        let settings = &self.ctx.settings;
        if !settings.work_on_network {
            return Ok(0);
        }
        let remote: Vec<_> = extract_all(text).into_iter().filter(|r| r.is_remote()).collect();
        let resolved: Vec<ResolvedReference> = filter::filter(remote, &settings.block_list())
            .into_iter()
            .map(ResolvedReference::remote)
            .collect();
        if resolved.is_empty() {
            return Ok(0);
        }
        let urls = dispatch::upload(self.ctx, &resolved).await?;
        let updated = rewrite(&self.editor.get_value(), &resolved, &urls, settings)?;
        self.editor.set_value(&updated);
        info!(count = resolved.len(), "relinked pasted images");
        Ok(resolved.len())
    }

    /// Handles one paste event.
    ///
    /// Pasted text goes in as-is unless the paste is taken over by file
    /// uploads. Remote images in the text are relinked alongside, and each
    /// pasted file runs as its own concurrent session.
    pub async fn handle_paste(&self, clipboard: &ClipboardContent) -> PasteOutcome {
        let settings = &self.ctx.settings;
        if !auto_upload_enabled(&self.editor.get_value(), settings) {
            self.editor.replace_selection(&clipboard.text);
            return PasteOutcome { disabled: true, ..PasteOutcome::default() };
        }

        let upload_files = can_upload(clipboard, settings);
        if !upload_files {
            self.editor.replace_selection(&clipboard.text);
        }
        let sessions: Vec<_> = if upload_files {
            clipboard.files.iter().map(|file| self.paste_file(file.clone())).collect()
        } else {
            Vec::new()
        };

        let (relinked, uploads) =
            futures::join!(self.relink_pasted_text(&clipboard.text), join_all(sessions));
        let relinked = relinked.unwrap_or_else(|e| {
            warn!(error = %e, "relinking pasted images failed");
            0
        });
        PasteOutcome { disabled: false, relinked, uploads }
    }
}
