//! Editor surface port used by interactive paste and drop.

/// A cursor location: zero-based line and byte offset within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Byte offset within the line.
    pub ch: usize,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// The open document as the host editor exposes it.
///
/// Every method works on the then-current text. Writers racing on the same
/// document follow last-writer-wins.
pub trait Editor: Send + Sync {
    /// Vault-relative path of the active document, if any.
    fn document_path(&self) -> Option<String>;

    /// Switches the editor to another document.
    fn open_document(&self, path: &str, text: &str);

    /// Full document text.
    fn get_value(&self) -> String;

    /// Replaces the full document text.
    fn set_value(&self, text: &str);

    /// Currently selected text (empty when the selection is a bare cursor).
    fn get_selection(&self) -> String;

    /// Replaces the selection and leaves the cursor after the inserted text.
    fn replace_selection(&self, text: &str);

    /// Replaces the text between two positions.
    fn replace_range(&self, text: &str, from: Position, to: Position);
}
