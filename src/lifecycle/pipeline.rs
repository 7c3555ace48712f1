//! Request lifecycle orchestration.
//!
//! # Responsibilities
//! - Enforce the per-request ordering contract across subsystems:
//!   timer start and trace attach before dispatch, metrics and header
//!   injection after dispatch, trace detach last of all
//! - Label request metrics by resolved route, method, and status
//!
//! # Design Decisions
//! - One middleware owns the ordering instead of relying on hook
//!   registration order
//! - The trace guard is declared first inside the scope so its drop
//!   runs after every other teardown step, on success, server error,
//!   panic, and cancellation alike
//! - Error accounting keys off server-error status codes; the host
//!   framework has already converted handler failures into responses
//!   by the time they reach this layer

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use crate::metrics::{Labels, RequestMetrics};
use crate::trace::{self, TraceGuard, Tracer, X_REQUEST_ID};

/// Everything the lifecycle middleware needs, constructed once at
/// process start and shared across requests.
///
/// ```ignore
/// let pipeline = Arc::new(Pipeline::new(tracer, metrics));
/// let app = router.layer(middleware::from_fn_with_state(pipeline, lifecycle::run));
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    tracer: Tracer,
    metrics: RequestMetrics,
}

impl Pipeline {
    pub fn new(tracer: Tracer, metrics: RequestMetrics) -> Self {
        Self { tracer, metrics }
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }
}

/// The lifecycle middleware itself, for `middleware::from_fn_with_state`.
pub async fn run(
    State(pipeline): State<Arc<Pipeline>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let view = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let ctx = if pipeline.tracer.is_untraced(&path) {
        None
    } else {
        pipeline.tracer.extract(req.headers())
    };

    trace::scoped(async move {
        let _guard = match ctx {
            Some(ctx) => pipeline.tracer.attach(ctx),
            None => TraceGuard::noop(),
        };

        let mut response = next.run(req).await;

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let labels = Labels::request(&view, &method, response.status().as_u16());
        pipeline.metrics.requests.incr(1, &labels);
        pipeline.metrics.latency.observe(elapsed_ms, &labels);
        if response.status().is_server_error() {
            pipeline.metrics.errors.incr(1, &labels);
        }

        if let Some(trace_id) = pipeline.tracer.current_trace_id() {
            if let Ok(value) = HeaderValue::from_str(&trace_id) {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
        }

        // _guard drops when this block returns: detach is the last
        // thing that runs for a request that attached a context.
        response
    })
    .await
}
