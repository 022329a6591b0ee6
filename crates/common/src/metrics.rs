//! Metrics collection for WireBench
//!
//! This module provides the Prometheus byte counters and the batch duration
//! histogram shared by the driver and the processors. A registry is an owned
//! value: each service builds one at startup and hands an `Arc` to every
//! component that records into it.

use crate::error::Result;
use crate::model::{Protocol, Service};
use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

/// Bucket boundaries for `app_request_duration_seconds`
pub const DURATION_BUCKETS: [f64; 9] = [0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0];

const LABELS: [&str; 2] = ["protocol", "service"];

/// Metrics registry for WireBench
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,

    /// Total bytes written to the wire
    send_bytes: IntCounterVec,

    /// Total bytes read from the wire
    recv_bytes: IntCounterVec,

    /// End-to-end batch duration
    request_duration: HistogramVec,
}

impl MetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let send_bytes = IntCounterVec::new(
            Opts::new("app_send_bytes_total", "total sent bytes"),
            &LABELS,
        )?;

        let recv_bytes = IntCounterVec::new(
            Opts::new("app_recv_bytes_total", "total received bytes"),
            &LABELS,
        )?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new("app_request_duration_seconds", "request duration seconds")
                .buckets(DURATION_BUCKETS.to_vec()),
            &LABELS,
        )?;

        registry.register(Box::new(send_bytes.clone()))?;
        registry.register(Box::new(recv_bytes.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            send_bytes,
            recv_bytes,
            request_duration,
        })
    }

    /// Also export CPU, memory and file descriptor metrics of this process
    pub fn with_process_metrics(self) -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let collector = prometheus::process_collector::ProcessCollector::for_self();
            self.registry.register(Box::new(collector))?;
        }
        Ok(self)
    }

    /// Add `n` bytes to the send counter
    pub fn inc_send(&self, protocol: Protocol, service: Service, n: u64) {
        self.send_bytes
            .with_label_values(&[protocol.as_str(), service.as_str()])
            .inc_by(n);
    }

    /// Add `n` bytes to the receive counter
    pub fn inc_recv(&self, protocol: Protocol, service: Service, n: u64) {
        self.recv_bytes
            .with_label_values(&[protocol.as_str(), service.as_str()])
            .inc_by(n);
    }

    /// Record one batch duration
    pub fn observe_duration(&self, protocol: Protocol, service: Service, seconds: f64) {
        self.request_duration
            .with_label_values(&[protocol.as_str(), service.as_str()])
            .observe(seconds);
    }

    /// Current value of the send counter; 0 for a series never written
    pub fn send_bytes(&self, protocol: Protocol, service: Service) -> u64 {
        find_series(&self.send_bytes, protocol, service)
            .map_or(0, |metric| metric.get_counter().get_value() as u64)
    }

    /// Current value of the receive counter; 0 for a series never written
    pub fn recv_bytes(&self, protocol: Protocol, service: Service) -> u64 {
        find_series(&self.recv_bytes, protocol, service)
            .map_or(0, |metric| metric.get_counter().get_value() as u64)
    }

    /// Number of durations observed
    pub fn duration_count(&self, protocol: Protocol, service: Service) -> u64 {
        find_series(&self.request_duration, protocol, service)
            .map_or(0, |metric| metric.get_histogram().get_sample_count())
    }

    /// Gather all metrics as text
    pub fn gather(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| crate::error::WireBenchError::internal(format!("metrics text: {}", e)))
    }
}

/// Look up an existing labelled series without creating it.
///
/// `with_label_values` would materialize an empty series that then shows up
/// in every scrape.
fn find_series<C: Collector>(
    collector: &C,
    protocol: Protocol,
    service: Service,
) -> Option<prometheus::proto::Metric> {
    let (protocol, service) = (protocol.as_str(), service.as_str());
    collector
        .collect()
        .into_iter()
        .flat_map(|mut family| family.take_metric().into_vec())
        .find(|metric| {
            metric.get_label().iter().all(|pair| match pair.get_name() {
                "protocol" => pair.get_value() == protocol,
                "service" => pair.get_value() == service,
                _ => true,
            })
        })
}

/// Content type of [`MetricsRegistry::gather`] output
pub fn content_type() -> &'static str {
    prometheus::TEXT_FORMAT
}
