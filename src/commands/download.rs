//! `picflow download` command.

use super::{notice, open_document, save_document};
use crate::context::ServiceContext;
use crate::pipeline::download_document;

/// Execute the `download` command.
///
/// Failed downloads are listed but do not fail the command.
///
/// # Errors
///
/// Returns an error string if the document cannot be read or written.
pub async fn run(ctx: &ServiceContext, doc: &str) -> Result<(), String> {
    let (editor, original) = open_document(ctx, doc)?;
    let report = match download_document(ctx, &editor).await {
        Ok(report) => report,
        Err(e) => return notice(e),
    };
    save_document(ctx, &editor, &original)?;

    println!("Downloaded {} image(s) in {doc}.", report.downloaded);
    for (url, reason) in &report.failed {
        println!("  failed: {url} ({reason})");
    }
    Ok(())
}
