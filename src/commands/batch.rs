//! `picflow batch-upload` and `picflow batch-download` commands.

use crate::batch::{batch_download, batch_upload, BatchSummary, DocumentStatus};
use crate::context::ServiceContext;

fn print_summary(summary: &BatchSummary) {
    if summary.documents == 0 {
        println!("No markdown documents in folder.");
        return;
    }
    for outcome in &summary.outcomes {
        match &outcome.status {
            DocumentStatus::Skipped => println!("  skip  {}", outcome.path),
            DocumentStatus::Transferred { count, failed: 0 } => {
                println!("  ok    {} ({count})", outcome.path);
            }
            DocumentStatus::Transferred { count, failed } => {
                println!("  ok    {} ({count}, {failed} failed)", outcome.path);
            }
            DocumentStatus::Failed(reason) => println!("  fail  {}: {reason}", outcome.path),
        }
    }
    println!(
        "\nProcessed {}/{} document(s): {} of {} image(s) transferred.",
        summary.processed, summary.documents, summary.succeeded, summary.images
    );
}

/// Execute the `batch-upload` command.
///
/// # Errors
///
/// Returns an error string if the vault cannot be listed. Per-document
/// failures are reported in the summary instead.
pub async fn run_upload(ctx: &ServiceContext, folder: &str) -> Result<(), String> {
    let summary = batch_upload(ctx, folder, None).await.map_err(|e| e.to_string())?;
    print_summary(&summary);
    Ok(())
}

/// Execute the `batch-download` command.
///
/// # Errors
///
/// Returns an error string if the vault cannot be listed.
pub async fn run_download(ctx: &ServiceContext, folder: &str) -> Result<(), String> {
    let summary = batch_download(ctx, folder).await.map_err(|e| e.to_string())?;
    print_summary(&summary);
    Ok(())
}
