//! Replaying adapters that serve recorded interactions.

pub mod documents;
pub mod id_gen;
pub mod transfer;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;

pub use documents::ReplayingDocumentStore;
pub use id_gen::ReplayingIdGenerator;
pub use transfer::ReplayingTransferBackend;

/// Pop the next recorded output for `port::method`.
///
/// Mirror of `recording::record_interaction`.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method).output.clone()
}

/// Decode an output recorded by `recording::record_result`.
///
/// `{"Err": msg}` becomes an error carrying `msg`; `{"Ok": v}` is
/// deserialized into `T`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: &serde_json::Value,
    context: &str,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(err) = output.get("Err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("Ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("{context}: failed to deserialize: {e}").into())
}
