//! WireBench Driver
//!
//! Generates batches of synthetic payloads, sends them to a processor over
//! REST or a gRPC stream, and accounts bytes and elapsed time per batch.

pub mod api;
pub mod batch;
pub mod grpc_client;
pub mod rest_client;

pub use api::driver_router;
pub use batch::{run_stream_batch, run_unary_batch, Driver};
pub use grpc_client::GrpcClient;
pub use rest_client::RestClient;
