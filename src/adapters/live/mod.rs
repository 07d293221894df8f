//! Live adapters for real external interactions.

pub mod documents;
pub mod editor;
pub mod id_gen;
pub mod transfer;

pub use documents::LiveDocumentStore;
pub use editor::BufferEditor;
pub use id_gen::LiveIdGenerator;
pub use transfer::LiveTransferBackend;
