//! HTTP client for the REST processor

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::trace;
use wirebench_common::{Result, WireBenchError};

/// REST processor client
///
/// Sends pre-serialized JSON bodies so the caller can account exactly the
/// bytes that go on the wire.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl RestClient {
    /// Create a client for the processor at `endpoint` (scheme + host + port)
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| WireBenchError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: format!("{}/process", endpoint.trim_end_matches('/')),
            timeout,
        })
    }

    /// Target URL of every call
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST one JSON body and return the raw response body
    pub async fn call(&self, body: Vec<u8>) -> Result<Bytes> {
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WireBenchError::transport(format!(
                "{} returned {}",
                self.url, status
            )));
        }

        let bytes = response.bytes().await.map_err(|e| self.map_error(e))?;
        trace!("{} answered with {} bytes", self.url, bytes.len());
        Ok(bytes)
    }

    fn map_error(&self, err: reqwest::Error) -> WireBenchError {
        if err.is_timeout() {
            WireBenchError::timeout(format!("POST {} after {:?}", self.url, self.timeout))
        } else {
            WireBenchError::transport(format!("POST {}: {}", self.url, err))
        }
    }
}
