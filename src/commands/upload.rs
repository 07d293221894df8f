//! `picflow upload` and `picflow upload-file` commands.

use super::{notice, open_document, save_document};
use crate::context::ServiceContext;
use crate::pipeline::{upload_document, upload_single_file, UploadReport};
use crate::ports::VaultFile;

fn print_report(doc: &str, report: &UploadReport) {
    println!("Uploaded {} image(s) in {doc}.", report.uploaded);
    if report.unresolved > 0 {
        println!("{} local reference(s) did not resolve to an image.", report.unresolved);
    }
    if report.trashed > 0 {
        println!("Moved {} source file(s) to the trash.", report.trashed);
    }
}

/// Execute the `upload` command.
///
/// # Errors
///
/// Returns an error string if the document cannot be read or written, or
/// the upload fails.
pub async fn run(ctx: &ServiceContext, doc: &str) -> Result<(), String> {
    let (editor, original) = open_document(ctx, doc)?;
    match upload_document(ctx, &editor).await {
        Ok(report) => {
            save_document(ctx, &editor, &original)?;
            print_report(doc, &report);
            Ok(())
        }
        Err(e) => notice(e),
    }
}

/// Execute the `upload-file` command for one vault image.
///
/// # Errors
///
/// Returns an error string if the image does not exist, the document
/// cannot be read or written, or the upload fails.
pub async fn run_single(ctx: &ServiceContext, doc: &str, image: &str) -> Result<(), String> {
    if !ctx.store.exists(image) {
        return Err(format!("No such file in vault: {image}"));
    }
    let (editor, original) = open_document(ctx, doc)?;
    match upload_single_file(ctx, &editor, &VaultFile::from_path(image)).await {
        Ok(report) => {
            save_document(ctx, &editor, &original)?;
            print_report(doc, &report);
            Ok(())
        }
        Err(e) => notice(e),
    }
}
