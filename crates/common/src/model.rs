//! Wire model shared by the driver and the processors
//!
//! JSON shapes for the REST path, the streaming summary, and the batch
//! result returned to trigger callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Transport style under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// HTTP + JSON request/response
    Rest,

    /// gRPC client-streaming
    Grpc,
}

impl Protocol {
    /// Label value used in metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Rest => "rest",
            Protocol::Grpc => "grpc",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical service that owns a metric sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Client,
    ProcessorRest,
    ProcessorGrpc,
}

impl Service {
    /// Label value used in metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Client => "client",
            Service::ProcessorRest => "processor-rest",
            Service::ProcessorGrpc => "processor-grpc",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single synthetic payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub value: f64,
    pub pad: String,
}

impl Payload {
    /// Build a payload from an arbitrary JSON body.
    ///
    /// Never fails: a missing or non-numeric `value` becomes `0` and a
    /// missing or non-string `pad` becomes empty.
    pub fn from_json_lenient(body: &Value) -> Self {
        let value = coerce_value(body.get("value"));
        let pad = body
            .get("pad")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { value, pad }
    }
}

/// Coerce a JSON value to a number, treating anything non-numeric as zero.
///
/// Numbers are taken as-is and numeric strings are parsed. `null`, booleans,
/// arrays, objects, unparseable strings and NaN all yield `0`.
pub fn coerce_value(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    coerce_f64(parsed.unwrap_or(0.0))
}

/// Map NaN to zero, pass every other float through
pub fn coerce_f64(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Filler string of `size` repetitions of `'x'`
pub fn make_pad(size: usize) -> String {
    "x".repeat(size)
}

/// Response of the unary transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnaryResponse {
    pub processed: f64,
}

impl UnaryResponse {
    /// Square the payload value
    pub fn transform(value: f64) -> Self {
        Self {
            processed: value * value,
        }
    }
}

/// Aggregate emitted once when a payload stream closes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub count: u64,
    pub sum: f64,
    pub mean: f64,
}

impl StreamSummary {
    /// Build a summary from a count and running sum
    pub fn from_totals(count: u64, sum: f64) -> Self {
        let mean = if count > 0 { sum / count as f64 } else { 0.0 };
        Self { count, sum, mean }
    }
}

impl From<wirebench_proto::Summary> for StreamSummary {
    fn from(summary: wirebench_proto::Summary) -> Self {
        Self {
            count: summary.count,
            sum: summary.sum,
            mean: summary.mean,
        }
    }
}

impl From<StreamSummary> for wirebench_proto::Summary {
    fn from(summary: StreamSummary) -> Self {
        Self {
            count: summary.count,
            sum: summary.sum,
            mean: summary.mean,
        }
    }
}

/// Parameters of one triggered batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Number of payloads to send
    pub count: u64,

    /// Length of the pad string in each payload
    pub size: usize,
}

/// Outcome of one completed batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub protocol: Protocol,
    pub count: u64,
    pub size: usize,
    pub send_bytes: u64,
    pub recv_bytes: u64,
    pub elapsed_seconds: f64,

    /// Aggregate returned by the streaming processor
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<StreamSummary>,
}
