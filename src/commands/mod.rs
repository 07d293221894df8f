//! Command dispatch and handlers.

pub mod batch;
pub mod download;
pub mod paste;
pub mod scan;
pub mod upload;

use std::env;
use std::path::PathBuf;

use crate::adapters::live::BufferEditor;
use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::error::PipelineError;
use crate::ports::Editor;

/// Dispatch a parsed command line to its handler.
///
/// When `PICFLOW_RECORD` is set to a directory path, all port interactions
/// are recorded to per-port cassette files in that directory.
///
/// # Errors
///
/// Returns an error string if settings cannot be loaded or the selected
/// command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let settings =
        Settings::discover(&cli.vault, cli.config.as_deref()).map_err(|e| e.to_string())?;

    let (ctx, session) = if let Ok(path) = env::var("PICFLOW_RECORD") {
        let (ctx, session) = ServiceContext::recording(&PathBuf::from(path), &cli.vault, settings)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&cli.vault, settings), None)
    };

    let result = dispatch_with_context(&cli.command, &ctx);

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        // Drop context first to release Arc references
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the async runtime cannot start or the
/// handler fails.
pub fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    runtime.block_on(async {
        match command {
            Command::Scan { doc } => scan::run(ctx, doc),
            Command::Upload { doc } => upload::run(ctx, doc).await,
            Command::UploadFile { doc, image } => upload::run_single(ctx, doc, image).await,
            Command::Download { doc } => download::run(ctx, doc).await,
            Command::BatchUpload { folder } => batch::run_upload(ctx, folder).await,
            Command::BatchDownload { folder } => batch::run_download(ctx, folder).await,
            Command::Paste { doc, line, files, text } => {
                paste::run_paste(ctx, doc, *line, files, text).await
            }
            Command::Drop { doc, line, files } => paste::run_drop(ctx, doc, *line, files).await,
        }
    })
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}

/// Loads a stored document into an editor buffer.
fn open_document(ctx: &ServiceContext, doc: &str) -> Result<(BufferEditor, String), String> {
    let text = ctx.store.read(doc).map_err(|e| format!("Failed to read {doc}: {e}"))?;
    Ok((BufferEditor::new(doc, text.clone()), text))
}

/// Writes the buffer back when the handler changed it.
fn save_document(ctx: &ServiceContext, editor: &BufferEditor, original: &str) -> Result<(), String> {
    let Some(doc) = editor.document_path() else {
        return Ok(());
    };
    let text = editor.get_value();
    if text == original {
        return Ok(());
    }
    ctx.store.write(&doc, &text).map_err(|e| format!("Failed to write {doc}: {e}"))
}

/// Turns a pipeline error into the notice printed to the user.
///
/// Running out of work is not a failure of the command.
fn notice(err: PipelineError) -> Result<(), String> {
    if err.is_nothing_to_do() {
        println!("{err}");
        Ok(())
    } else {
        Err(err.to_string())
    }
}
