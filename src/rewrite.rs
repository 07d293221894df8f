//! Document Rewriter: swaps each reference's source markup for new markup.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::config::{DisplayNamePolicy, Settings};
use crate::context::ServiceContext;
use crate::dispatch::DownloadedImage;
use crate::error::PipelineError;
use crate::reference::ResolvedReference;
use crate::vault_path;

/// Display name rendered for `name` under the configured policy.
#[must_use]
pub fn display_name(name: &str, settings: &Settings) -> String {
    let keep = || format!("{name}{}", settings.image_size_suffix);
    match settings.image_desc {
        DisplayNamePolicy::Keep => keep(),
        DisplayNamePolicy::Blank => String::new(),
        DisplayNamePolicy::BlankIfDefault if name == settings.default_image_name => String::new(),
        DisplayNamePolicy::BlankIfDefault => keep(),
    }
}

/// `![name](target)`.
#[must_use]
pub fn render_markup(name: &str, target: &str) -> String {
    format!("![{name}]({target})")
}

/// Replaces every occurrence of each reference's source with markup
/// pointing at its uploaded location. Empty locations are skipped.
///
/// # Errors
///
/// Returns [`PipelineError::ResultCountMismatch`] when `locations` does not
/// line up with `references`; no replacement is made in that case.
pub fn rewrite(
    text: &str,
    references: &[ResolvedReference],
    locations: &[String],
    settings: &Settings,
) -> Result<String, PipelineError> {
    if references.len() != locations.len() {
        return Err(PipelineError::ResultCountMismatch {
            expected: references.len(),
            actual: locations.len(),
        });
    }
    let mut out = text.to_string();
    for (resolved, location) in references.iter().zip(locations) {
        if location.is_empty() {
            continue;
        }
        let reference = &resolved.reference;
        let markup = render_markup(&display_name(&reference.name, settings), location);
        out = out.replace(&reference.source, &markup);
    }
    Ok(out)
}

/// Points each downloaded reference at its saved file.
#[must_use]
pub fn rewrite_downloads(text: &str, downloads: &[DownloadedImage], settings: &Settings) -> String {
    downloads.iter().fold(text.to_string(), |out, image| {
        let markup =
            render_markup(&display_name(&image.name, settings), &vault_path::encode_path(&image.path));
        out.replace(&image.reference.source, &markup)
    })
}

/// Moves the local files behind bound references to the trash when
/// `delete_source` is on. Failures are logged and skipped. Returns the
/// number of files trashed.
pub fn trash_sources(ctx: &ServiceContext, references: &[ResolvedReference]) -> usize {
    if !ctx.settings.delete_source {
        return 0;
    }
    let mut seen = HashSet::new();
    let mut trashed = 0;
    for file in references.iter().filter_map(|r| r.file.as_ref()) {
        if !seen.insert(file.path.as_str()) {
            continue;
        }
        match ctx.store.trash(&file.path) {
            Ok(()) => {
                info!(path = %file.path, "trashed uploaded source");
                trashed += 1;
            }
            Err(e) => warn!(path = %file.path, error = %e, "could not trash uploaded source"),
        }
    }
    trashed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::VaultFile;
    use crate::reference::{extract_all, Reference};
    use crate::testing::{test_context, FakeTransfer, MemStore};

    fn bound(source: &str, path: &str, name: &str) -> ResolvedReference {
        ResolvedReference::bound(Reference::new(source, path, name), VaultFile::from_path(path))
    }

    #[test]
    fn display_name_policies() {
        let mut settings = Settings { image_size_suffix: "|300".into(), ..Settings::default() };
        assert_eq!(display_name("cat", &settings), "cat|300");

        settings.image_desc = DisplayNamePolicy::Blank;
        assert_eq!(display_name("cat", &settings), "");

        settings.image_desc = DisplayNamePolicy::BlankIfDefault;
        assert_eq!(display_name("image.png", &settings), "");
        assert_eq!(display_name("cat", &settings), "cat|300");
    }

    #[test]
    fn rewrite_replaces_every_occurrence_of_a_source() {
        let text = "![a](a.png)\ntext\n![a](a.png)\n![[b.png]]";
        let refs = vec![bound("![a](a.png)", "a.png", "a"), bound("![[b.png]]", "b.png", "b")];
        let urls = vec!["https://cdn/a.png".to_string(), "https://cdn/b.png".to_string()];

        let out = rewrite(text, &refs, &urls, &Settings::default()).unwrap();
        assert_eq!(out, "![a](https://cdn/a.png)\ntext\n![a](https://cdn/a.png)\n![b](https://cdn/b.png)");
    }

    #[test]
    fn blank_names_keep_every_image_on_a_shared_line() {
        let text = "![a](x.png) ![b](<y.png>)";
        let refs: Vec<ResolvedReference> = extract_all(text)
            .into_iter()
            .map(|r| {
                let path = r.path.clone();
                ResolvedReference::bound(r, VaultFile::from_path(path))
            })
            .collect();
        let urls = vec!["https://cdn/x.png".to_string(), "https://cdn/y.png".to_string()];
        let settings = Settings { image_desc: DisplayNamePolicy::Blank, ..Settings::default() };

        let out = rewrite(text, &refs, &urls, &settings).unwrap();
        assert_eq!(out, "![](https://cdn/x.png) ![](https://cdn/y.png)");
    }

    #[test]
    fn count_mismatch_leaves_text_unchanged() {
        let refs = vec![bound("![a](a.png)", "a.png", "a"), bound("![b](b.png)", "b.png", "b")];
        let err = rewrite("![a](a.png) ![b](b.png)", &refs, &["https://cdn/a.png".to_string()], &Settings::default())
            .unwrap_err();
        assert_eq!(err, PipelineError::ResultCountMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn empty_location_keeps_the_original_markup() {
        let refs = vec![bound("![a](a.png)", "a.png", "a")];
        let out = rewrite("![a](a.png)", &refs, &[String::new()], &Settings::default()).unwrap();
        assert_eq!(out, "![a](a.png)");
    }

    #[test]
    fn rewritten_text_only_extracts_remote_references() {
        let text = "![a](<./x y.png>) ![[b.png|50]] <img src=\"c.png\">";
        let refs: Vec<ResolvedReference> = extract_all(text)
            .into_iter()
            .map(|r| {
                let path = vault_path::file_name(&r.path).to_string();
                ResolvedReference::bound(r, VaultFile::from_path(path))
            })
            .collect();
        let urls: Vec<String> = refs.iter().map(|r| format!("https://cdn/{}", r.path.replace(' ', "_"))).collect();

        let out = rewrite(text, &refs, &urls, &Settings::default()).unwrap();
        let again = extract_all(&out);

        assert_eq!(again.len(), 3);
        assert!(again.iter().all(Reference::is_remote));
        let second = rewrite(&out, &refs, &urls, &Settings::default()).unwrap();
        assert_eq!(second, out);
    }

    #[test]
    fn downloads_render_encoded_relative_paths() {
        let image = DownloadedImage {
            reference: Reference::new("![x](https://x.com/my cat.png)", "https://x.com/my cat.png", "x"),
            name: "my cat".into(),
            path: "../attachments/my cat.png".into(),
        };
        let out = rewrite_downloads("see ![x](https://x.com/my cat.png)", &[image], &Settings::default());
        assert_eq!(out, "see ![my cat](../attachments/my%20cat.png)");
    }

    #[test]
    fn trash_sources_respects_the_toggle_and_survives_failures() {
        let store = MemStore::with_files(&[("a.png", "A"), ("b.png", "B")]);
        let transfer = FakeTransfer::default();
        let refs = vec![
            bound("![](a.png)", "a.png", ""),
            bound("![x](a.png)", "a.png", "x"),
            bound("![](b.png)", "b.png", ""),
            ResolvedReference::remote(Reference::new("![](https://x/c.png)", "https://x/c.png", "")),
        ];

        let ctx = test_context(&store, &transfer, Settings::default());
        assert_eq!(trash_sources(&ctx, &refs), 0);

        let ctx = test_context(&store, &transfer, Settings { delete_source: true, ..Settings::default() });
        assert_eq!(trash_sources(&ctx, &refs), 2);
        assert_eq!(store.trashed(), vec!["a.png", "b.png"]);

        let failing = MemStore::with_files(&[("a.png", "A")]);
        failing.fail_trash();
        let ctx = test_context(&failing, &transfer, Settings { delete_source: true, ..Settings::default() });
        assert_eq!(trash_sources(&ctx, &refs), 0);
        assert_eq!(failing.text("a.png"), "A");
    }
}
