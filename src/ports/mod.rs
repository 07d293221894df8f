//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the relink core and something
//! the host owns (the vault on disk, the upload service, the open editor,
//! random identifiers). Implementations live in `src/adapters/`.

pub mod documents;
pub mod editor;
pub mod id_gen;
pub mod transfer;

pub use documents::{DocumentStore, VaultFile};
pub use editor::{Editor, Position};
pub use id_gen::IdGenerator;
pub use transfer::{FetchFuture, FetchResponse, TransferBackend, UploadFuture, UploadResponse};
