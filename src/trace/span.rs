//! Request span shaping for `tower_http::trace::TraceLayer`.
//!
//! # Responsibilities
//! - Name request spans by method and path for trace-backend readability
//! - Record the inbound trace id on the span so every event inside the
//!   request carries it
//! - Suppress spans entirely for untraced route prefixes
//!
//! # Design Decisions
//! - `tracing` span names are static, so method and path are recorded
//!   as fields on a single `request` span rather than as dynamic names

use axum::http::Request;
use tower_http::trace::MakeSpan;
use tracing::Span;

use crate::trace::context::TraceContext;
use crate::trace::propagator::{Tracer, TRACEPARENT};

/// Span factory for the HTTP trace layer.
///
/// ```ignore
/// let app = router.layer(TraceLayer::new_for_http().make_span_with(RequestSpan::new(tracer)));
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpan {
    tracer: Tracer,
}

impl RequestSpan {
    pub fn new(tracer: Tracer) -> Self {
        Self { tracer }
    }
}

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        if !self.tracer.is_enabled() || self.tracer.is_untraced(request.uri().path()) {
            return Span::none();
        }

        let trace_id = request
            .headers()
            .get(&TRACEPARENT)
            .and_then(|v| v.to_str().ok())
            .and_then(TraceContext::parse)
            .map(|ctx| ctx.trace_id.to_hex());

        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            trace_id = trace_id.as_deref().unwrap_or(""),
        )
    }
}
