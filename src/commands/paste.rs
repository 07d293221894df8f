//! `picflow paste` and `picflow drop` commands.
//!
//! Both load the document into an editor buffer, place the cursor at the
//! start of `line`, run the sessions and write the buffer back.

use super::{open_document, save_document};
use crate::context::ServiceContext;
use crate::ports::Position;
use crate::session::{ClipboardContent, SessionManager};

/// Host paths handed to the uploader are absolute.
fn host_paths(files: &[String]) -> Vec<String> {
    files
        .iter()
        .map(|f| std::path::absolute(f).map_or_else(|_| f.clone(), |p| p.display().to_string()))
        .collect()
}

/// Execute the `paste` command.
///
/// Every file gets its own placeholder and upload; the uploads run
/// concurrently and settle in whatever order they finish.
///
/// # Errors
///
/// Returns an error string if the document cannot be read or written.
/// Failed uploads leave a failure marker in the document instead.
pub async fn run_paste(
    ctx: &ServiceContext,
    doc: &str,
    line: usize,
    files: &[String],
    text: &str,
) -> Result<(), String> {
    let (editor, original) = open_document(ctx, doc)?;
    editor.set_cursor(Position::new(line, 0));

    let clipboard = ClipboardContent { files: host_paths(files), text: text.to_string() };
    let outcome = SessionManager::new(ctx, &editor).handle_paste(&clipboard).await;
    save_document(ctx, &editor, &original)?;

    if outcome.disabled {
        println!("Auto-upload is off for {doc}; nothing uploaded.");
        return Ok(());
    }
    for (file, result) in files.iter().zip(&outcome.uploads) {
        match result {
            Ok(url) => println!("{file} -> {url}"),
            Err(e) => println!("{file}: {e}"),
        }
    }
    if outcome.relinked > 0 {
        println!("Relinked {} image(s) from the pasted text.", outcome.relinked);
    }
    Ok(())
}

/// Execute the `drop` command.
///
/// # Errors
///
/// Returns an error string if the document cannot be read or written, or
/// the upload fails.
pub async fn run_drop(
    ctx: &ServiceContext,
    doc: &str,
    line: usize,
    files: &[String],
) -> Result<(), String> {
    let (editor, original) = open_document(ctx, doc)?;
    editor.set_cursor(Position::new(line, 0));

    let result = SessionManager::new(ctx, &editor).drop_files(host_paths(files)).await;
    save_document(ctx, &editor, &original)?;

    let urls = result.map_err(|e| e.to_string())?;
    if urls.is_empty() {
        println!("Drop ignored: auto-upload is off or the first file is not an image.");
    }
    for (file, url) in files.iter().zip(&urls) {
        println!("{file} -> {url}");
    }
    Ok(())
}
