//! Shared middleware for axum services deployed behind reverse proxies.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────┐
//!                 │                 MIDDLEWARE STACK              │
//!                 │                                               │
//!  Client Request │  ┌───────────┐   ┌───────────┐   ┌─────────┐  │
//!  ───────────────┼─▶│   proxy   │──▶│ lifecycle │──▶│ handler │  │
//!                 │  │ header fix│   │ pipeline  │   │ (yours) │  │
//!                 │  └───────────┘   └─────┬─────┘   └────┬────┘  │
//!                 │                        │              │       │
//!                 │                        ▼              ▼       │
//!                 │                  ┌───────────┐  ┌──────────┐  │
//!                 │                  │   trace   │  │ metrics  │  │
//!                 │                  │ propagate │  │  statsd  │  │
//!                 │                  └───────────┘  └──────────┘  │
//!                 │                                               │
//!                 │  config: trust counts, tracing flag, sinks    │
//!                 └───────────────────────────────────────────────┘
//! ```
//!
//! The proxy layer rewrites transport metadata from trusted
//! `X-Forwarded-*` headers before anything else sees the request. The
//! lifecycle pipeline times the request, attaches the inbound trace
//! context, records per-route metrics, injects `X-Request-ID`, and
//! detaches the context last of all. Response shaping (cache-control
//! defaults, security headers) slots in between.
//!
//! # Wiring
//!
//! ```ignore
//! let config = config::from_env()?;
//! logging::init(&config);
//!
//! let tracer = if config.observability.tracing_enabled {
//!     Tracer::enabled(config.observability.untraced_routes.clone())
//! } else {
//!     Tracer::disabled()
//! };
//! let sink: Arc<dyn MetricsSink> =
//!     Arc::new(StatsdSink::new(config.observability.statsd_address.parse()?)?);
//! let pipeline = Arc::new(Pipeline::new(tracer.clone(), RequestMetrics::new(sink)));
//!
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(lifecycle::headers::frame_options())
//!     .layer(middleware::from_fn(lifecycle::apply_cache_defaults))
//!     .layer(middleware::from_fn_with_state(pipeline, lifecycle::run))
//!     .layer(TraceLayer::new_for_http().make_span_with(RequestSpan::new(tracer)))
//!     .layer(ProxyFixLayer::new(config.proxy.clone()));
//! ```

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod metrics;
pub mod proxy;
pub mod trace;

pub use config::BaseConfig;
pub use lifecycle::Pipeline;
pub use metrics::{MetricsSink, RequestMetrics, StatsdSink};
pub use proxy::{ForwardedMetadata, ForwardedOrig, ProxyFixLayer, TrustedProxies};
pub use trace::{current_trace_id, RequestSpan, TraceContext, Tracer};
