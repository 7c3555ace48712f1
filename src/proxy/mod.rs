//! Reverse-proxy header handling subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request (peer address, Host header, X-Forwarded-* chain)
//!     → layer.rs (build transport metadata, apply outermost)
//!     → forwarded.rs (trust-bounded resolution, pure)
//!     → request extensions (ForwardedMetadata + ForwardedOrig)
//!     → handlers / downstream middleware
//! ```
//!
//! # Design Decisions
//! - Resolution is a pure function; the layer is thin plumbing around it
//! - Original values always survive in `ForwardedOrig`

pub mod forwarded;
pub mod layer;

pub use forwarded::{resolve, trusted_value, ForwardedMetadata, ForwardedOrig, TrustedProxies};
pub use layer::{ProxyFix, ProxyFixLayer};
