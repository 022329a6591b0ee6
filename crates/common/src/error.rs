//! Common error types for WireBench
//!
//! This module defines all error types used across the WireBench services.
//! All errors are convertible to gRPC status codes for proper error propagation.

use std::net::AddrParseError;
use thiserror::Error;

/// Main error type for WireBench
#[derive(Error, Debug)]
pub enum WireBenchError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// gRPC status returned by a peer
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    /// gRPC transport errors
    #[error("gRPC transport error: {0}")]
    GrpcTransport(#[from] tonic::transport::Error),

    /// Downstream transport failures (connection refused, disconnect, bad status)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Message received after a stream was finalized
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Metrics registration or encoding errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AddrParseError> for WireBenchError {
    fn from(err: AddrParseError) -> Self {
        WireBenchError::Parse(err.to_string())
    }
}

impl From<config::ConfigError> for WireBenchError {
    fn from(err: config::ConfigError) -> Self {
        WireBenchError::Config(err.to_string())
    }
}

impl WireBenchError {
    /// Convert error to gRPC status code
    pub fn to_status(&self) -> tonic::Status {
        match self {
            WireBenchError::Grpc(status) => status.clone(),
            WireBenchError::GrpcTransport(_) => tonic::Status::unavailable("Transport error"),
            WireBenchError::Transport(msg) => {
                tonic::Status::unavailable(format!("Transport error: {}", msg))
            }
            WireBenchError::Config(msg) => {
                tonic::Status::internal(format!("Configuration error: {}", msg))
            }
            WireBenchError::Timeout(msg) => {
                tonic::Status::deadline_exceeded(format!("Timeout: {}", msg))
            }
            WireBenchError::ProtocolViolation(msg) => {
                tonic::Status::failed_precondition(format!("Protocol violation: {}", msg))
            }
            WireBenchError::InvalidInput(msg) => {
                tonic::Status::invalid_argument(format!("Invalid input: {}", msg))
            }
            WireBenchError::Parse(msg) => {
                tonic::Status::invalid_argument(format!("Parse error: {}", msg))
            }
            WireBenchError::Serialization(err) => {
                tonic::Status::internal(format!("Serialization error: {}", err))
            }
            WireBenchError::Metrics(err) => {
                tonic::Status::internal(format!("Metrics error: {}", err))
            }
            WireBenchError::Io(err) => tonic::Status::internal(format!("I/O error: {}", err)),
            WireBenchError::Internal(msg) => {
                tonic::Status::internal(format!("Internal error: {}", msg))
            }
        }
    }

    /// True for failures caused by the downstream peer or the network
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            WireBenchError::Grpc(_)
                | WireBenchError::GrpcTransport(_)
                | WireBenchError::Transport(_)
                | WireBenchError::Timeout(_)
        )
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        WireBenchError::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        WireBenchError::Transport(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        WireBenchError::Timeout(msg.into())
    }

    /// Create a protocol violation error
    pub fn protocol_violation(msg: impl Into<String>) -> Self {
        WireBenchError::ProtocolViolation(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        WireBenchError::InvalidInput(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        WireBenchError::Internal(msg.into())
    }
}

/// Result type alias for WireBench operations
pub type Result<T> = std::result::Result<T, WireBenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            WireBenchError::timeout("unary call").to_status().code(),
            tonic::Code::DeadlineExceeded
        );
        assert_eq!(
            WireBenchError::protocol_violation("late message").to_status().code(),
            tonic::Code::FailedPrecondition
        );
        assert_eq!(
            WireBenchError::transport("refused").to_status().code(),
            tonic::Code::Unavailable
        );
    }

    #[test]
    fn test_transport_classification() {
        assert!(WireBenchError::transport("refused").is_transport());
        assert!(WireBenchError::Grpc(tonic::Status::cancelled("gone")).is_transport());
        assert!(!WireBenchError::config("bad port").is_transport());
        assert!(!WireBenchError::protocol_violation("late").is_transport());
    }
}
