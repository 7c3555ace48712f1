//! Metric transmission sinks.
//!
//! # Responsibilities
//! - Define the transmission seam between instruments and transport
//! - Push samples to a statsd collector over UDP, one line per sample
//! - Keep an in-process recording sink for tests and local inspection
//!
//! # Design Decisions
//! - `record` never returns an error and never panics; a slow or
//!   unreachable collector must not stall or break request handling
//! - Each push is an independent fire-and-forget datagram, no batching,
//!   no retries; failures are logged at warn level
//! - Line format is statsd with DogStatsD tags:
//!   `name:value|type[|#k1:v1,k2:v2]`

use std::fmt;
use std::io;
use std::net::{SocketAddr, UdpSocket};

use dashmap::DashMap;

use crate::metrics::labels::Labels;

/// Kind of a metric sample, mapped to the statsd type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Monotonic counter (`c`).
    Counter,
    /// Duration in milliseconds (`ms`).
    Timing,
}

impl SampleKind {
    fn statsd_type(self) -> &'static str {
        match self {
            SampleKind::Counter => "c",
            SampleKind::Timing => "ms",
        }
    }
}

/// Transmission seam for metric samples.
///
/// Implementations must be safe for concurrent use from every request
/// worker and must never propagate transport failures to the caller.
pub trait MetricsSink: fmt::Debug + Send + Sync {
    fn record(&self, name: &str, value: f64, kind: SampleKind, labels: &Labels);
}

/// Encode one sample as a statsd line.
fn encode(name: &str, value: f64, kind: SampleKind, labels: &Labels) -> String {
    let mut line = format!("{name}:{value}|{}", kind.statsd_type());
    if !labels.is_empty() {
        line.push_str("|#");
        for (i, (key, val)) in labels.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(key);
            line.push(':');
            line.push_str(val);
        }
    }
    line
}

/// Push-based statsd sink over UDP.
#[derive(Debug)]
pub struct StatsdSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl StatsdSink {
    /// Bind an ephemeral local socket pointed at the collector.
    pub fn new(target: SocketAddr) -> io::Result<Self> {
        let bind_addr = if target.is_ipv4() {
            SocketAddr::new(std::net::Ipv4Addr::UNSPECIFIED.into(), 0)
        } else {
            SocketAddr::new(std::net::Ipv6Addr::UNSPECIFIED.into(), 0)
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket, target })
    }
}

impl MetricsSink for StatsdSink {
    fn record(&self, name: &str, value: f64, kind: SampleKind, labels: &Labels) {
        let line = encode(name, value, kind, labels);
        if let Err(error) = self.socket.send_to(line.as_bytes(), self.target) {
            tracing::warn!(metric = name, %error, "failed to push metric");
        }
    }
}

/// Running state for one `(name, labels)` series in the recording sink.
#[derive(Debug, Default, Clone)]
pub struct LabeledSeries {
    /// Sum of counter increments.
    pub total: f64,
    /// Every timing observation, in milliseconds, in arrival order.
    pub observations: Vec<f64>,
}

/// In-process sink that folds samples into per-label running series.
///
/// Label cardinality is unbounded: every distinct label combination
/// creates a new series. Fine for tests, a scaling caveat anywhere else.
#[derive(Debug, Default)]
pub struct RecordingSink {
    series: DashMap<(String, Labels), LabeledSeries>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of counter increments for a series, 0 when never touched.
    pub fn counter_total(&self, name: &str, labels: &Labels) -> f64 {
        self.series
            .get(&(name.to_string(), labels.clone()))
            .map(|s| s.total)
            .unwrap_or(0.0)
    }

    /// All timing observations for a series, in arrival order.
    pub fn observations(&self, name: &str, labels: &Labels) -> Vec<f64> {
        self.series
            .get(&(name.to_string(), labels.clone()))
            .map(|s| s.observations.clone())
            .unwrap_or_default()
    }

    /// Number of distinct series seen so far.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

impl MetricsSink for RecordingSink {
    fn record(&self, name: &str, value: f64, kind: SampleKind, labels: &Labels) {
        let mut series = self
            .series
            .entry((name.to_string(), labels.clone()))
            .or_default();
        match kind {
            SampleKind::Counter => series.total += value,
            SampleKind::Timing => series.observations.push(value),
        }
    }
}
