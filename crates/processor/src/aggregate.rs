//! Per-stream aggregation state machine
//!
//! One [`StreamAggregator`] exists per inbound `ProcessStream` call. It moves
//! `Open -> Accumulating -> Closed` and produces its summary exactly once.

use uuid::Uuid;
use wirebench_common::model::coerce_f64;
use wirebench_common::{Result, StreamSummary, WireBenchError};

/// Lifecycle of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No message seen yet
    Open,

    /// At least one message folded in
    Accumulating,

    /// Summary emitted; terminal
    Closed,
}

/// Summary plus the inbound byte total to account at close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finalized {
    pub summary: StreamSummary,
    pub recv_bytes: u64,
}

/// Running count/sum for a single stream
#[derive(Debug)]
pub struct StreamAggregator {
    id: Uuid,
    state: StreamState,
    count: u64,
    sum: f64,
    recv_bytes: u64,
}

impl StreamAggregator {
    /// Create an aggregator in the `Open` state
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            state: StreamState::Open,
            count: 0,
            sum: 0.0,
            recv_bytes: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Messages folded in so far
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Fold one inbound message of `encoded_len` bytes into the totals.
    ///
    /// Rejected once the stream is closed; the finalized summary is untouched.
    pub fn accept(&mut self, value: f64, encoded_len: usize) -> Result<()> {
        if self.state == StreamState::Closed {
            return Err(WireBenchError::protocol_violation(format!(
                "message received after stream {} closed",
                self.id
            )));
        }

        self.state = StreamState::Accumulating;
        self.count += 1;
        self.sum += coerce_f64(value);
        self.recv_bytes += encoded_len as u64;
        Ok(())
    }

    /// Close the stream and produce its summary. Succeeds at most once.
    pub fn finish(&mut self) -> Result<Finalized> {
        if self.state == StreamState::Closed {
            return Err(WireBenchError::protocol_violation(format!(
                "stream {} already finalized",
                self.id
            )));
        }

        let finalized = Finalized {
            summary: StreamSummary::from_totals(self.count, self.sum),
            recv_bytes: self.recv_bytes,
        };

        self.state = StreamState::Closed;
        self.count = 0;
        self.sum = 0.0;
        self.recv_bytes = 0;

        Ok(finalized)
    }
}
