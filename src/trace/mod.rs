//! Distributed-trace propagation subsystem.
//!
//! # Data Flow
//! ```text
//! traceparent header
//!     → context.rs (parse, validate, render 32-hex ids)
//!     → propagator.rs (attach to request scope, detach guard)
//!     → span.rs (request span named by method/path, trace id recorded)
//!     → X-Request-ID response header (injected by the lifecycle pipeline)
//! ```
//!
//! # Design Decisions
//! - One context per request, attached at start, detached last at teardown
//! - A disabled tracer is a first-class strategy, not an absent import

pub mod context;
pub mod propagator;
pub mod span;

pub use context::{TraceContext, TraceId};
pub use propagator::{current_trace_id, scoped, TraceGuard, Tracer, TRACEPARENT, X_REQUEST_ID};
pub use span::RequestSpan;
