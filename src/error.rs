//! Error taxonomy for the relink pipeline.
//!
//! Malformed markup and unresolved local references are not errors: the
//! extractor drops the former and the resolver counts the latter.

/// Failure of one pipeline operation (one document, one paste, one batch).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Nothing in the document survived extraction, filtering and resolution.
    #[error("can not find image file")]
    NothingToTransfer,

    /// No document is open in the editor surface.
    #[error("no active document")]
    NoActiveDocument,

    /// The transfer backend reported failure or could not be reached.
    #[error("transfer failed: {0}")]
    TransferBackend(String),

    /// The backend returned a different number of results than items sent.
    #[error("upload returned {actual} results for {expected} images")]
    ResultCountMismatch {
        /// Number of references sent.
        expected: usize,
        /// Number of locations received.
        actual: usize,
    },

    /// The active document changed while the transfer was in flight.
    #[error("active document changed from {expected} to {actual}, upload discarded")]
    DocumentContextChanged {
        /// Document targeted when the operation started.
        expected: String,
        /// Document active when the transfer settled.
        actual: String,
    },

    /// A document store operation failed.
    #[error("file system error: {0}")]
    FileSystem(String),

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Wraps a port error raised by the document store.
    pub(crate) fn fs(context: &str, err: impl std::fmt::Display) -> Self {
        Self::FileSystem(format!("{context}: {err}"))
    }

    /// Returns `true` when the failure left the document untouched because
    /// nothing was sent to the backend.
    #[must_use]
    pub fn is_nothing_to_do(&self) -> bool {
        matches!(self, Self::NothingToTransfer)
    }
}
