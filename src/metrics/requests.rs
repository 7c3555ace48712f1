//! Per-request metric bundle.

use std::sync::Arc;

use crate::metrics::instruments::{Counter, Histogram};
use crate::metrics::sink::MetricsSink;

/// The three request-cycle instruments, all labeled
/// `{view, method, status}`.
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    /// Total requests completed.
    pub requests: Counter,
    /// Request latency in milliseconds.
    pub latency: Histogram,
    /// Requests that ended in a server error.
    pub errors: Counter,
}

impl RequestMetrics {
    pub fn new(sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            requests: Counter::new("http_requests", sink.clone()),
            latency: Histogram::new("http_latency", sink.clone()),
            errors: Counter::new("http_errors", sink),
        }
    }
}
