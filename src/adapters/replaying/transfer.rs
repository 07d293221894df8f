//! Replaying adapter for the `TransferBackend` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::transfer::{FetchFuture, TransferBackend, UploadFuture};

/// Replays recorded transfer calls.
///
/// The recorded output is taken when the call is made, not when the future
/// is polled, so replay order follows call order.
pub struct ReplayingTransferBackend {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingTransferBackend {
    /// Creates a replaying backend from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl TransferBackend for ReplayingTransferBackend {
    fn upload_local(&self, _items: &[String]) -> UploadFuture<'_> {
        let output = next_output(&self.replayer, "transfer", "upload_local");
        Box::pin(async move { replay_result(&output, "transfer::upload_local") })
    }

    fn fetch_remote(&self, _url: &str) -> FetchFuture<'_> {
        let output = next_output(&self.replayer, "transfer", "fetch_remote");
        Box::pin(async move { replay_result(&output, "transfer::fetch_remote") })
    }
}
