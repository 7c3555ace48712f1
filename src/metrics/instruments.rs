//! Counter and histogram instruments.
//!
//! # Responsibilities
//! - Thin, clonable handles binding a metric name to a sink
//! - Scoped timing helper that observes on drop
//!
//! # Design Decisions
//! - Instruments share the sink via `Arc`; cloning is cheap and every
//!   clone feeds the same series
//! - No instrument method returns an error; transmission failures stop
//!   at the sink

use std::sync::Arc;
use std::time::Instant;

use crate::metrics::labels::Labels;
use crate::metrics::sink::{MetricsSink, SampleKind};

/// Monotonic counter.
#[derive(Debug, Clone)]
pub struct Counter {
    name: String,
    sink: Arc<dyn MetricsSink>,
}

impl Counter {
    pub fn new(name: impl Into<String>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            name: name.into(),
            sink,
        }
    }

    /// Increment by `amount` with the given label set.
    pub fn incr(&self, amount: u64, labels: &Labels) {
        self.sink
            .record(&self.name, amount as f64, SampleKind::Counter, labels);
    }
}

/// Duration histogram, unit milliseconds.
#[derive(Debug, Clone)]
pub struct Histogram {
    name: String,
    sink: Arc<dyn MetricsSink>,
}

impl Histogram {
    pub fn new(name: impl Into<String>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            name: name.into(),
            sink,
        }
    }

    /// Record one observation, in milliseconds.
    pub fn observe(&self, millis: f64, labels: &Labels) {
        self.sink
            .record(&self.name, millis, SampleKind::Timing, labels);
    }

    /// Start a scoped timer. The elapsed time is observed when the
    /// returned guard drops, however the scope exits.
    pub fn time(&self, labels: Labels) -> Timer {
        Timer {
            histogram: self.clone(),
            labels,
            start: Instant::now(),
        }
    }
}

/// Scoped-duration guard returned by [`Histogram::time`].
#[derive(Debug)]
#[must_use = "dropping the timer records the elapsed time"]
pub struct Timer {
    histogram: Histogram,
    labels: Labels,
    start: Instant,
}

impl Drop for Timer {
    fn drop(&mut self) {
        let millis = self.start.elapsed().as_secs_f64() * 1000.0;
        self.histogram.observe(millis, &self.labels);
    }
}
