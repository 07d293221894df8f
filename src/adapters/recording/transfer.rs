//! Recording adapter for the `TransferBackend` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::transfer::{FetchFuture, TransferBackend, UploadFuture};

/// Records transfer calls while delegating to an inner backend.
///
/// Interactions are recorded when the call settles, so the cassette holds
/// them in completion order.
pub struct RecordingTransferBackend {
    inner: Box<dyn TransferBackend>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTransferBackend {
    /// Creates a recording backend wrapping the given implementation.
    pub fn new(inner: Box<dyn TransferBackend>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct UploadInput<'a> {
    items: &'a [String],
}

#[derive(Serialize)]
struct FetchInput<'a> {
    url: &'a str,
}

impl TransferBackend for RecordingTransferBackend {
    fn upload_local(&self, items: &[String]) -> UploadFuture<'_> {
        let items = items.to_vec();
        Box::pin(async move {
            let result = self.inner.upload_local(&items).await;
            let input = UploadInput { items: &items };
            record_result(&self.recorder, "transfer", "upload_local", &input, &result);
            result
        })
    }

    fn fetch_remote(&self, url: &str) -> FetchFuture<'_> {
        let url = url.to_string();
        Box::pin(async move {
            let result = self.inner.fetch_remote(&url).await;
            record_result(&self.recorder, "transfer", "fetch_remote", &FetchInput { url: &url }, &result);
            result
        })
    }
}
