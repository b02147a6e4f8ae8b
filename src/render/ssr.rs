//! Pre-render (SSR) service client.
//!
//! # Responsibilities
//! - POST the encoded page to `<base>/render`
//! - Decode `{head: [..], body: ".."}` on a `200 OK`
//!
//! # Design Decisions
//! - Every call is bounded by the configured timeout (connect, send, and decode)
//! - Failures are returned as `SsrError` for the caller to log; they never reach
//!   the handler, which falls back to client-side bootstrap

use std::time::Duration;

use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::timeout;

/// Fragments returned by the pre-render service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SsrResponse {
    #[serde(default)]
    pub head: Vec<String>,
    #[serde(default)]
    pub body: String,
}

/// Reasons a pre-render attempt was abandoned.
#[derive(Debug, Error)]
pub enum SsrError {
    #[error("pre-render request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("pre-render timed out after {0:?}")]
    Timeout(Duration),

    #[error("pre-render service responded with {0}")]
    Status(StatusCode),
}

/// Client for the pre-render service.
#[derive(Debug, Clone)]
pub struct SsrClient {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl SsrClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self::with_client(base_url, reqwest::Client::new(), timeout)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            endpoint: format!("{}/render", base_url.trim_end_matches('/')),
            client,
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Render an encoded page.
    pub async fn render(&self, page: Bytes) -> Result<SsrResponse, SsrError> {
        let call = async {
            let response = self
                .client
                .post(&self.endpoint)
                .header(CONTENT_TYPE, "application/json")
                .body(page)
                .send()
                .await?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(SsrError::Status(status));
            }

            Ok::<_, SsrError>(response.json::<SsrResponse>().await?)
        };

        timeout(self.timeout, call)
            .await
            .map_err(|_| SsrError::Timeout(self.timeout))?
    }
}
