//! Live adapter for the `TransferBackend` port.
//!
//! Uploads go to a PicGo-compatible HTTP server (PicGo, PicList), which
//! accepts `{"list": [...]}` and answers `{"success": bool, "result": [...]}`.
//! Fetches are plain HTTP GETs.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ports::transfer::{
    FetchFuture, FetchResponse, TransferBackend, UploadFuture, UploadResponse,
};

/// Live transfer backend talking HTTP.
pub struct LiveTransferBackend {
    client: Client,
    endpoint: String,
}

impl LiveTransferBackend {
    /// Creates a backend that uploads to `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into() }
    }
}

/// Request body sent to the upload server.
#[derive(Serialize)]
struct PicGoRequest<'a> {
    list: &'a [String],
}

/// Response body of the upload server. PicList reports errors in `msg`.
#[derive(Deserialize)]
struct PicGoResponse {
    success: bool,
    #[serde(default)]
    result: Vec<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

impl From<PicGoResponse> for UploadResponse {
    fn from(response: PicGoResponse) -> Self {
        Self {
            success: response.success,
            urls: response.result,
            message: response.message.or(response.msg),
        }
    }
}

impl TransferBackend for LiveTransferBackend {
    fn upload_local(&self, items: &[String]) -> UploadFuture<'_> {
        let items = items.to_vec();

        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&PicGoRequest { list: &items })
                .send()
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("upload request to {} failed: {e}", self.endpoint).into()
                })?;

            let status = response.status();
            let body =
                response.text().await.map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("failed to read upload response: {e}").into()
                })?;

            if !status.is_success() {
                return Ok(UploadResponse {
                    success: false,
                    urls: Vec::new(),
                    message: Some(format!("upload server answered {}: {body}", status.as_u16())),
                });
            }

            let parsed: PicGoResponse = serde_json::from_str(&body).map_err(
                |e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("failed to parse upload response: {e}").into()
                },
            )?;
            Ok(parsed.into())
        })
    }

    fn fetch_remote(&self, url: &str) -> FetchFuture<'_> {
        let url = url.to_string();

        Box::pin(async move {
            let response = self.client.get(&url).send().await.map_err(
                |e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("request to {url} failed: {e}").into()
                },
            )?;
            let status = response.status().as_u16();
            let bytes =
                response.bytes().await.map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                    format!("failed to read body of {url}: {e}").into()
                })?;
            Ok(FetchResponse { status, bytes: bytes.to_vec() })
        })
    }
}
