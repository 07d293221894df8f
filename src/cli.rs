//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `picflow`.
#[derive(Debug, Parser)]
#[command(name = "picflow", version, about = "Upload, download and relink images in markdown vaults")]
pub struct Cli {
    /// Vault root directory.
    #[arg(long, global = true, default_value = ".")]
    pub vault: PathBuf,

    /// Settings file (defaults to `<vault>/.picflow.yaml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
///
/// Document and folder arguments are vault-relative paths.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the image references of a document with their resolution.
    Scan {
        /// Document to inspect.
        doc: String,
    },
    /// Upload every image of a document and relink it.
    Upload {
        /// Document to process.
        doc: String,
    },
    /// Upload one vault image and relink the references to it.
    UploadFile {
        /// Document holding the references.
        doc: String,
        /// Vault-relative path of the image.
        image: String,
    },
    /// Download every remote image of a document into the vault.
    Download {
        /// Document to process.
        doc: String,
    },
    /// Upload the images of every document directly inside a folder.
    BatchUpload {
        /// Vault folder ("/" for the root).
        folder: String,
    },
    /// Download the remote images of every document directly inside a folder.
    BatchDownload {
        /// Vault folder ("/" for the root).
        folder: String,
    },
    /// Paste files at a line of a document, one upload session per file.
    Paste {
        /// Document to paste into.
        doc: String,
        /// Zero-based line of the cursor.
        line: usize,
        /// Host paths of the pasted files.
        #[arg(required = true)]
        files: Vec<String>,
        /// Plain text carried on the clipboard alongside the files.
        #[arg(long, default_value = "")]
        text: String,
    },
    /// Drop files at a line of a document, uploaded in one call.
    Drop {
        /// Document to drop into.
        doc: String,
        /// Zero-based line of the cursor.
        line: usize,
        /// Host paths of the dropped files.
        #[arg(required = true)]
        files: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_scan_with_default_vault() {
        let cli = Cli::parse_from(["picflow", "scan", "notes/a.md"]);
        assert_eq!(cli.vault, std::path::PathBuf::from("."));
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Command::Scan { ref doc } if doc == "notes/a.md"));
    }

    #[test]
    fn parses_global_options_after_subcommand() {
        let cli = Cli::parse_from(["picflow", "batch-upload", "notes", "--vault", "/v", "--config", "c.yaml"]);
        assert_eq!(cli.vault, std::path::PathBuf::from("/v"));
        assert_eq!(cli.config, Some(std::path::PathBuf::from("c.yaml")));
        assert!(matches!(cli.command, Command::BatchUpload { ref folder } if folder == "notes"));
    }

    #[test]
    fn parses_paste_with_files_and_text() {
        let cli = Cli::parse_from(["picflow", "paste", "a.md", "3", "x.png", "y.png", "--text", "hi"]);
        match cli.command {
            Command::Paste { doc, line, files, text } => {
                assert_eq!(doc, "a.md");
                assert_eq!(line, 3);
                assert_eq!(files, vec!["x.png", "y.png"]);
                assert_eq!(text, "hi");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn drop_requires_at_least_one_file() {
        assert!(Cli::try_parse_from(["picflow", "drop", "a.md", "0"]).is_err());
    }
}
