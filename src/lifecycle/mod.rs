//! Request lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request (transport metadata already resolved by proxy layer)
//!     → pipeline.rs (start timer, extract + attach trace context)
//!     → handler (opaque, may fail)
//!     → pipeline.rs (record metrics, inject X-Request-ID)
//!     → cache_control.rs / headers.rs (response shaping)
//!     → pipeline.rs guard drop (detach trace context, always last)
//! ```
//!
//! # Ordering
//! Layer order matters: response-shaping layers must sit *inside* the
//! pipeline so the pipeline observes the final status and detaches
//! after them. With axum, that means registering them before the
//! pipeline layer:
//!
//! ```ignore
//! Router::new()
//!     .route("/", get(handler))
//!     .layer(headers::frame_options())
//!     .layer(middleware::from_fn(cache_control::apply_cache_defaults))
//!     .layer(middleware::from_fn_with_state(pipeline, lifecycle::run))
//!     .layer(ProxyFixLayer::new(trust))   // outermost
//! ```

pub mod cache_control;
pub mod headers;
pub mod pipeline;

pub use cache_control::apply_cache_defaults;
pub use pipeline::{run, Pipeline};
