//! WireBench Protocol Buffers
//!
//! Generated gRPC contract shared by the streaming processor and the driver.

mod processor {
    tonic::include_proto!("processor");
}

pub use processor::{
    processor_client::ProcessorClient,
    processor_server::{Processor, ProcessorServer},
    Payload, Summary,
};
