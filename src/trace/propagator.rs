//! Trace-context attachment and propagation.
//!
//! # Responsibilities
//! - Extract a [`TraceContext`] from the `traceparent` request header
//! - Attach it to the current request scope and detach it exactly once
//! - Expose the active trace id to logging, metrics, and handlers
//!
//! # Design Decisions
//! - The tracer is an explicitly constructed strategy object: a
//!   disabled tracer turns every operation into a cheap no-op rather
//!   than relying on conditional wiring at import time
//! - The active context lives in a tokio task-local scoped around the
//!   handler future, so it is request-scoped by construction and can
//!   never leak into a concurrently handled request
//! - Detachment is a drop guard: it runs when the handler returns,
//!   panics, or the request future is dropped mid-flight

use std::cell::Cell;
use std::future::Future;

use axum::http::{HeaderMap, HeaderName};

use crate::trace::context::TraceContext;

/// Response header carrying the active trace id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request header carrying the inbound W3C trace context.
pub const TRACEPARENT: HeaderName = HeaderName::from_static("traceparent");

tokio::task_local! {
    static CURRENT: Cell<Option<TraceContext>>;
}

/// Run a future with fresh (empty) trace-context storage.
///
/// The lifecycle middleware wraps each handler invocation in this
/// scope; [`Tracer::attach`] and [`current_trace_id`] operate on the
/// innermost enclosing scope. Outside any scope both degrade to no-ops.
pub fn scoped<F>(fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    CURRENT.scope(Cell::new(None), fut)
}

/// The trace id attached to the current request scope, rendered as 32
/// lowercase hex characters. `None` outside a request or when nothing
/// was attached.
pub fn current_trace_id() -> Option<String> {
    CURRENT
        .try_with(|cell| cell.get())
        .ok()
        .flatten()
        .map(|ctx| ctx.trace_id.to_hex())
}

/// Trace propagation strategy.
///
/// Construct with [`Tracer::enabled`] at process start when the
/// deployment has a trace backend, or [`Tracer::disabled`] otherwise.
/// Every operation on a disabled tracer is a no-op, never an error.
#[derive(Debug, Clone)]
pub struct Tracer {
    enabled: bool,
    untraced_routes: Vec<String>,
}

impl Tracer {
    /// A tracer that never extracts, attaches, or reports anything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            untraced_routes: Vec::new(),
        }
    }

    /// An active tracer. Requests whose path starts with one of
    /// `untraced_routes` are excluded from instrumentation.
    pub fn enabled(untraced_routes: Vec<String>) -> Self {
        Self {
            enabled: true,
            untraced_routes,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a request path is excluded from instrumentation.
    pub fn is_untraced(&self, path: &str) -> bool {
        self.untraced_routes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Extract the inbound trace context, if any. A malformed
    /// `traceparent` degrades to `None` silently.
    pub fn extract(&self, headers: &HeaderMap) -> Option<TraceContext> {
        if !self.enabled {
            return None;
        }
        let value = headers.get(&TRACEPARENT)?.to_str().ok()?;
        TraceContext::parse(value)
    }

    /// Attach a context to the current request scope, returning the
    /// detach token. At most one context is active per request; a
    /// second attach replaces the first.
    pub fn attach(&self, ctx: TraceContext) -> TraceGuard {
        if !self.enabled {
            return TraceGuard::noop();
        }
        let attached = CURRENT
            .try_with(|cell| {
                cell.set(Some(ctx));
            })
            .is_ok();
        TraceGuard { attached }
    }

    /// The active trace id, gated on the deployment-time flag.
    pub fn current_trace_id(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        current_trace_id()
    }
}

/// Detach token returned by [`Tracer::attach`].
///
/// Dropping the guard clears the attached context. Drop runs exactly
/// once per attach, including when the handler panics or the request
/// future is cancelled.
#[derive(Debug)]
#[must_use = "dropping the guard detaches the trace context"]
pub struct TraceGuard {
    attached: bool,
}

impl TraceGuard {
    /// A guard that detaches nothing; safe to drop anywhere.
    pub fn noop() -> Self {
        Self { attached: false }
    }

    /// Explicitly release the attached context.
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        if self.attached {
            // The scope may already be gone when the request future is
            // torn down; that is fine, the storage went with it.
            let _ = CURRENT.try_with(|cell| cell.set(None));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::panic::AssertUnwindSafe;

    const SAMPLE: &str = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";
    const SAMPLE_ID: &str = "0af7651916cd43dd8448eb211c80319c";

    fn headers_with_traceparent(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TRACEPARENT, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_disabled_tracer_extracts_nothing() {
        let tracer = Tracer::disabled();
        let headers = headers_with_traceparent(SAMPLE);
        assert!(tracer.extract(&headers).is_none());
        assert!(tracer.current_trace_id().is_none());
    }

    #[test]
    fn test_malformed_traceparent_degrades_silently() {
        let tracer = Tracer::enabled(vec![]);
        let headers = headers_with_traceparent("garbage");
        assert!(tracer.extract(&headers).is_none());
    }

    #[tokio::test]
    async fn test_attach_and_detach() {
        let tracer = Tracer::enabled(vec![]);
        let ctx = TraceContext::parse(SAMPLE).unwrap();
        scoped(async move {
            assert!(current_trace_id().is_none());
            let guard = tracer.attach(ctx);
            assert_eq!(current_trace_id().as_deref(), Some(SAMPLE_ID));
            assert_eq!(tracer.current_trace_id().as_deref(), Some(SAMPLE_ID));
            guard.detach();
            assert!(current_trace_id().is_none());
        })
        .await;
    }

    #[tokio::test]
    async fn test_detach_runs_on_panic() {
        let tracer = Tracer::enabled(vec![]);
        let ctx = TraceContext::parse(SAMPLE).unwrap();
        scoped(async move {
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
                let _guard = tracer.attach(ctx);
                panic!("handler blew up");
            }));
            assert!(result.is_err());
            // Unwinding dropped the guard; the context must be gone.
            assert!(current_trace_id().is_none());
        })
        .await;
    }

    #[tokio::test]
    async fn test_scopes_are_isolated_between_tasks() {
        let tracer = Tracer::enabled(vec![]);
        let ctx = TraceContext::parse(SAMPLE).unwrap();
        scoped(async move {
            let _guard = tracer.attach(ctx);
            let other = tokio::spawn(scoped(async { current_trace_id() }));
            assert!(other.await.unwrap().is_none());
            assert_eq!(current_trace_id().as_deref(), Some(SAMPLE_ID));
        })
        .await;
    }

    #[test]
    fn test_attach_outside_scope_is_noop() {
        let tracer = Tracer::enabled(vec![]);
        let ctx = TraceContext::parse(SAMPLE).unwrap();
        let guard = tracer.attach(ctx);
        assert!(current_trace_id().is_none());
        drop(guard);
    }

    #[test]
    fn test_untraced_prefix_match() {
        let tracer = Tracer::enabled(vec!["/_status".into(), "/healthz".into()]);
        assert!(tracer.is_untraced("/_status"));
        assert!(tracer.is_untraced("/_status/ping"));
        assert!(!tracer.is_untraced("/api/_status"));
        assert!(!tracer.is_untraced("/"));
    }
}
