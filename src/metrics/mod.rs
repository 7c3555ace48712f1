//! Metrics subsystem.
//!
//! # Data Flow
//! ```text
//! request cycle / instrumented sub-operations
//!     → instruments.rs (Counter.incr, Histogram.observe, Timer)
//!     → sink.rs (MetricsSink seam)
//!         → StatsdSink: one UDP line per sample, fire-and-forget
//!         → RecordingSink: in-process labeled series (tests, inspection)
//! ```
//!
//! # Design Decisions
//! - Push-based: no in-process aggregation on the hot path, each call
//!   is an independent small write
//! - Transmission failures are caught and logged, never surfaced

pub mod instruments;
pub mod labels;
pub mod requests;
pub mod sink;

pub use instruments::{Counter, Histogram, Timer};
pub use labels::Labels;
pub use requests::RequestMetrics;
pub use sink::{LabeledSeries, MetricsSink, RecordingSink, SampleKind, StatsdSink};
