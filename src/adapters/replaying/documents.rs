//! Replaying adapter for the `DocumentStore` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::documents::{DocumentStore, VaultFile};

/// Replays recorded document store operations.
pub struct ReplayingDocumentStore {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingDocumentStore {
    /// Creates a replaying store from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl DocumentStore for ReplayingDocumentStore {
    fn read(&self, _path: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        replay_result(&next_output(&self.replayer, "store", "read"), "store::read")
    }

    fn write(&self, _path: &str, _text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        replay_result(&next_output(&self.replayer, "store", "write"), "store::write")
    }

    fn write_binary(
        &self,
        _path: &str,
        _bytes: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        replay_result(&next_output(&self.replayer, "store", "write_binary"), "store::write_binary")
    }

    fn list_files(&self) -> Result<Vec<VaultFile>, Box<dyn std::error::Error + Send + Sync>> {
        replay_result(&next_output(&self.replayer, "store", "list_files"), "store::list_files")
    }

    fn exists(&self, _path: &str) -> bool {
        next_output(&self.replayer, "store", "exists")
            .as_bool()
            .expect("store::exists: expected boolean output")
    }

    fn trash(&self, _path: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        replay_result(&next_output(&self.replayer, "store", "trash"), "store::trash")
    }
}
