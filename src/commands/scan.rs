//! `picflow scan` command.

use crate::context::ServiceContext;
use crate::pipeline::inspect_document;
use crate::resolve::Resolution;

/// Execute the `scan` command.
///
/// Prints one row per image reference of `doc`: where it resolves, the
/// referenced path and its display name.
///
/// # Errors
///
/// Returns an error string if the document or the vault cannot be read.
pub fn run(ctx: &ServiceContext, doc: &str) -> Result<(), String> {
    let rows: Vec<(String, String, String)> = inspect_document(ctx, doc)
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|(reference, resolution)| {
            let status = match resolution {
                Resolution::Remote => "remote".to_string(),
                Resolution::Bound(file) => file.path,
                Resolution::Unresolved => "unresolved".to_string(),
            };
            (status, reference.path, reference.name)
        })
        .collect();

    if rows.is_empty() {
        println!("No image references in {doc}.");
        return Ok(());
    }

    let status_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(8).max(8);
    let path_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(4).max(4);

    println!("{:<status_width$}  {:<path_width$}  NAME", "RESOLVES", "PATH");
    println!("{:-<status_width$}  {:-<path_width$}  ----", "", "");
    for (status, path, name) in &rows {
        println!("{status:<status_width$}  {path:<path_width$}  {name}");
    }

    let unresolved = rows.iter().filter(|r| r.0 == "unresolved").count();
    println!("\n{} reference(s), {unresolved} unresolved.", rows.len());
    Ok(())
}
