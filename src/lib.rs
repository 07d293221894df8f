//! Core library entry for the `picflow` CLI.
//!
//! Finds image references in markdown documents, resolves local ones
//! against the vault, uploads or downloads them, and rewrites the markup to
//! point at the new location.

pub mod adapters;
pub mod batch;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod frontmatter;
pub mod pipeline;
pub mod ports;
pub mod reference;
pub mod resolve;
pub mod rewrite;
pub mod session;
pub mod vault_path;

#[cfg(test)]
mod testing;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_scans_a_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "![x](missing.png)\n").unwrap();
        let vault = dir.path().to_str().unwrap();

        let result = run(["picflow", "--vault", vault, "scan", "a.md"]);
        assert!(result.is_ok());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["picflow", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().to_str().unwrap();

        let result = run(["picflow", "--vault", vault, "upload", "nope.md"]);
        assert!(result.unwrap_err().contains("nope.md"));
    }
}
