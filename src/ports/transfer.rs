//! Transfer backend port: the service that actually moves image bytes.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Boxed future returned by [`TransferBackend::upload_local`].
pub type UploadFuture<'a> =
    Pin<Box<dyn Future<Output = Result<UploadResponse, Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// Boxed future returned by [`TransferBackend::fetch_remote`].
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FetchResponse, Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// Outcome of one upload call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Whether the backend accepted every item.
    pub success: bool,
    /// Remote locations, in the order the items were sent.
    #[serde(default)]
    pub urls: Vec<String>,
    /// Backend-provided failure reason.
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw result of fetching a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub bytes: Vec<u8>,
}

/// Uploads local files to a remote host and fetches remote assets.
///
/// Timeouts and retries are the backend's business; the core never
/// cancels a call.
pub trait TransferBackend: Send + Sync {
    /// Uploads items (absolute local paths or remote URLs) in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn upload_local(&self, items: &[String]) -> UploadFuture<'_>;

    /// Fetches the bytes behind a remote URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be read.
    fn fetch_remote(&self, url: &str) -> FetchFuture<'_>;
}
