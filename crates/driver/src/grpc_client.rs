//! gRPC client for the streaming processor

use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;
use wirebench_common::{Result, WireBenchError};
use wirebench_proto::ProcessorClient;

/// Connection settings for the stream processor
#[derive(Debug, Clone)]
pub struct GrpcClient {
    endpoint: String,
    timeout: Duration,
}

impl GrpcClient {
    /// Create a client for `endpoint`; nothing is dialed until [`connect`](Self::connect)
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Bound on connecting and on each stream call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Dial a fresh channel, one per batch
    pub async fn connect(&self) -> Result<ProcessorClient<Channel>> {
        let endpoint = Endpoint::from_shared(self.endpoint.clone())
            .map_err(|e| WireBenchError::config(format!("Invalid endpoint {}: {}", self.endpoint, e)))?
            .connect_timeout(self.timeout);

        let channel = endpoint.connect().await.map_err(|e| {
            WireBenchError::transport(format!("Failed to connect to {}: {}", self.endpoint, e))
        })?;

        debug!("Connected to stream processor at {}", self.endpoint);
        Ok(ProcessorClient::new(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GrpcClient::new(&format!("http://{}", addr), Duration::from_secs(2));
        let err = client.connect().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let client = GrpcClient::new("not a uri", Duration::from_secs(1));
        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, WireBenchError::Config(_)));
    }
}
