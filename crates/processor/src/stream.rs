//! gRPC streaming transformer
//!
//! Implements `processor.Processor/ProcessStream`: folds every inbound
//! payload into a fresh [`StreamAggregator`] and replies with one summary
//! when the client closes its half of the stream.

use crate::aggregate::StreamAggregator;
use prost::Message;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{transport::Server, Request, Response, Status, Streaming};
use tracing::{debug, info, warn};
use uuid::Uuid;
use wirebench_common::{MetricsRegistry, Protocol, Result, Service};
use wirebench_proto::{Payload, Processor, ProcessorServer, Summary};

/// Stream aggregation service
pub struct StreamProcessor {
    metrics: Arc<MetricsRegistry>,
}

impl StreamProcessor {
    /// Create a new stream processor recording into `metrics`
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    /// Wrap in the generated tonic server type
    pub fn into_service(self) -> ProcessorServer<Self> {
        ProcessorServer::new(self)
    }
}

#[tonic::async_trait]
impl Processor for StreamProcessor {
    async fn process_stream(
        &self,
        request: Request<Streaming<Payload>>,
    ) -> std::result::Result<Response<Summary>, Status> {
        let mut inbound = request.into_inner();
        let mut aggregator = StreamAggregator::new(Uuid::new_v4());
        let stream_id = aggregator.id();

        debug!(%stream_id, "stream opened");

        loop {
            match inbound.message().await {
                Ok(Some(payload)) => {
                    aggregator
                        .accept(payload.value, payload.encoded_len())
                        .map_err(|e| e.to_status())?;
                }
                Ok(None) => break,
                Err(status) => {
                    // Abort without a partial summary or any accounting
                    warn!(
                        %stream_id,
                        received = aggregator.count(),
                        "stream aborted: {}",
                        status
                    );
                    return Err(status);
                }
            }
        }

        let finalized = aggregator.finish().map_err(|e| e.to_status())?;
        self.metrics
            .inc_recv(Protocol::Grpc, Service::ProcessorGrpc, finalized.recv_bytes);

        let reply = Summary::from(finalized.summary);
        self.metrics.inc_send(
            Protocol::Grpc,
            Service::ProcessorGrpc,
            reply.encoded_len() as u64,
        );

        info!(
            %stream_id,
            count = reply.count,
            sum = reply.sum,
            mean = reply.mean,
            recv_bytes = finalized.recv_bytes,
            "stream closed"
        );

        Ok(Response::new(reply))
    }
}

/// Serve the stream processor on `listener` until `shutdown` resolves
pub async fn serve_grpc<F>(
    listener: TcpListener,
    metrics: Arc<MetricsRegistry>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let addr = listener.local_addr()?;
    info!("Processor gRPC server listening on {}", addr);

    Server::builder()
        .add_service(StreamProcessor::new(metrics).into_service())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await?;

    Ok(())
}
