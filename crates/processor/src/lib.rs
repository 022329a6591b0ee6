//! WireBench Processor
//!
//! Downstream transformers under test: a stateless HTTP + JSON squarer and a
//! gRPC stream aggregator.

pub mod aggregate;
pub mod rest;
pub mod stream;

pub use aggregate::{Finalized, StreamAggregator, StreamState};
pub use rest::{process, rest_router};
pub use stream::{serve_grpc, StreamProcessor};
