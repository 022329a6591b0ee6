//! WireBench common library
//!
//! This crate contains shared code used across the WireBench driver and processors.

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod model;
pub mod telemetry;

// Re-export commonly used types
pub use config::{DriverConfig, Mode, WireBenchConfig};
pub use error::{Result, WireBenchError};
pub use metrics::MetricsRegistry;
pub use model::{BatchRequest, BatchResult, Payload, Protocol, Service, StreamSummary, UnaryResponse};
