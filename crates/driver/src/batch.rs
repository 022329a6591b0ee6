//! Batch orchestration
//!
//! A batch is `count` payloads sharing one pad of length `size`. The unary
//! path makes strictly sequential round-trips; the streaming path writes
//! every payload onto one open stream and waits for the single summary.
//! Every byte is added to the registry at the moment it is sent or received,
//! so a failed batch leaves its partial counts visible.

use crate::grpc_client::GrpcClient;
use crate::rest_client::RestClient;
use prost::Message;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};
use wirebench_common::model::make_pad;
use wirebench_common::{
    BatchRequest, BatchResult, DriverConfig, MetricsRegistry, Payload, Protocol, Result, Service,
    StreamSummary, WireBenchError,
};
use wirebench_proto as proto;

/// Run a unary batch against the REST processor.
///
/// `values` supplies the payload value for each call in order.
pub async fn run_unary_batch<V>(
    client: &RestClient,
    metrics: &MetricsRegistry,
    request: BatchRequest,
    mut values: V,
) -> Result<BatchResult>
where
    V: FnMut() -> f64 + Send,
{
    let start = Instant::now();
    let pad = make_pad(request.size);
    let mut send_bytes = 0u64;
    let mut recv_bytes = 0u64;

    for _ in 0..request.count {
        let payload = Payload {
            value: values(),
            pad: pad.clone(),
        };
        let body = serde_json::to_vec(&payload)?;

        let len = body.len() as u64;
        send_bytes += len;
        metrics.inc_send(Protocol::Rest, Service::Client, len);

        let response = client.call(body).await?;

        let len = response.len() as u64;
        recv_bytes += len;
        metrics.inc_recv(Protocol::Rest, Service::Client, len);
    }

    let elapsed_seconds = start.elapsed().as_secs_f64();
    metrics.observe_duration(Protocol::Rest, Service::Client, elapsed_seconds);

    Ok(BatchResult {
        protocol: Protocol::Rest,
        count: request.count,
        size: request.size,
        send_bytes,
        recv_bytes,
        elapsed_seconds,
        summary: None,
    })
}

/// Run a streaming batch against the gRPC processor.
///
/// Writes are pushed onto an unbounded channel feeding the request stream,
/// so no write waits on the server. The call's outcome arrives exactly once
/// on a oneshot.
pub async fn run_stream_batch<V>(
    client: &GrpcClient,
    metrics: &MetricsRegistry,
    request: BatchRequest,
    mut values: V,
) -> Result<BatchResult>
where
    V: FnMut() -> f64 + Send,
{
    let start = Instant::now();
    let pad = make_pad(request.size);

    let mut grpc = client.connect().await?;

    let (tx, rx) = mpsc::unbounded_channel::<proto::Payload>();
    let (done_tx, done_rx) = oneshot::channel::<Result<proto::Summary>>();

    let deadline = client.timeout();
    tokio::spawn(async move {
        let call = grpc.process_stream(UnboundedReceiverStream::new(rx));
        let outcome = match tokio::time::timeout(deadline, call).await {
            Ok(response) => response
                .map(tonic::Response::into_inner)
                .map_err(WireBenchError::from),
            Err(_) => Err(WireBenchError::timeout(format!(
                "stream call exceeded {:?}",
                deadline
            ))),
        };
        let _ = done_tx.send(outcome);
    });

    let send_bytes = feed_stream(&tx, metrics, request.count, &pad, &mut values);

    // End of input
    drop(tx);

    let summary = done_rx
        .await
        .map_err(|_| WireBenchError::internal("stream call ended without an outcome"))??;

    let recv = summary.encoded_len() as u64;
    metrics.inc_recv(Protocol::Grpc, Service::Client, recv);

    let elapsed_seconds = start.elapsed().as_secs_f64();
    metrics.observe_duration(Protocol::Grpc, Service::Client, elapsed_seconds);

    Ok(BatchResult {
        protocol: Protocol::Grpc,
        count: request.count,
        size: request.size,
        send_bytes,
        recv_bytes: recv,
        elapsed_seconds,
        summary: Some(StreamSummary::from(summary)),
    })
}

/// Push `count` payloads onto the request stream.
///
/// A payload is counted only once the stream has taken it. Returns the
/// bytes written; stops early if the call has already finished.
fn feed_stream<V>(
    tx: &mpsc::UnboundedSender<proto::Payload>,
    metrics: &MetricsRegistry,
    count: u64,
    pad: &str,
    values: &mut V,
) -> u64
where
    V: FnMut() -> f64,
{
    let mut send_bytes = 0u64;

    for _ in 0..count {
        let payload = proto::Payload {
            value: values(),
            pad: pad.to_string(),
        };
        let len = payload.encoded_len() as u64;

        if tx.send(payload).is_err() {
            // The call already finished; its outcome says why
            debug!("stream closed before all payloads were written");
            break;
        }

        send_bytes += len;
        metrics.inc_send(Protocol::Grpc, Service::Client, len);
    }

    send_bytes
}

/// Load driver: owns the transports and the registry handle
pub struct Driver {
    config: DriverConfig,
    metrics: Arc<MetricsRegistry>,
    rest: RestClient,
    grpc: GrpcClient,
}

impl Driver {
    /// Create a new driver from its configuration
    pub fn new(config: DriverConfig, metrics: Arc<MetricsRegistry>) -> Result<Self> {
        let timeout = config.request_timeout();
        let rest = RestClient::new(&config.rest_endpoint, timeout)?;
        let grpc = GrpcClient::new(&config.grpc_endpoint, timeout);

        Ok(Self {
            config,
            metrics,
            rest,
            grpc,
        })
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Fill in configured defaults for omitted trigger parameters
    pub fn resolve(&self, count: Option<u64>, size: Option<usize>) -> BatchRequest {
        BatchRequest {
            count: count.unwrap_or(self.config.default_count),
            size: size.unwrap_or(self.config.default_size),
        }
    }

    /// Run one batch with uniformly random values in `[0, 1)`
    pub async fn trigger(&self, protocol: Protocol, request: BatchRequest) -> Result<BatchResult> {
        let mut rng = StdRng::from_entropy();
        self.trigger_with_values(protocol, request, move || rng.gen::<f64>())
            .await
    }

    /// Run one batch with caller-supplied values
    pub async fn trigger_with_values<V>(
        &self,
        protocol: Protocol,
        request: BatchRequest,
        values: V,
    ) -> Result<BatchResult>
    where
        V: FnMut() -> f64 + Send,
    {
        if request.size > self.config.max_size {
            return Err(WireBenchError::invalid_input(format!(
                "size {} exceeds the limit of {}",
                request.size, self.config.max_size
            )));
        }

        info!(
            %protocol,
            count = request.count,
            size = request.size,
            "batch started"
        );

        let outcome = match protocol {
            Protocol::Rest => run_unary_batch(&self.rest, &self.metrics, request, values).await,
            Protocol::Grpc => run_stream_batch(&self.grpc, &self.metrics, request, values).await,
        };

        match &outcome {
            Ok(result) => info!(
                %protocol,
                count = result.count,
                send_bytes = result.send_bytes,
                recv_bytes = result.recv_bytes,
                elapsed_seconds = result.elapsed_seconds,
                "batch finished"
            ),
            Err(e) => warn!(%protocol, count = request.count, "batch failed: {}", e),
        }

        outcome
    }
}
