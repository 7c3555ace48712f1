//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files;
//! every field has a default so a minimal config is valid.

use serde::{Deserialize, Serialize};

use crate::proxy::TrustedProxies;

/// Root configuration for the middleware stack.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BaseConfig {
    /// Service name, used in log output. Tracing is conventionally
    /// enabled by the deployment that sets this.
    pub service_name: Option<String>,

    /// Forwarded-header trust counts.
    pub proxy: TrustedProxies,

    /// Tracing, metrics, and logging settings.
    pub observability: ObservabilityConfig,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Deployment-time flag enabling trace propagation. Off by
    /// default; every trace operation is a no-op when off.
    pub tracing_enabled: bool,

    /// Route path prefixes excluded from trace instrumentation.
    pub untraced_routes: Vec<String>,

    /// Statsd collector address for metric pushes.
    pub statsd_address: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            tracing_enabled: false,
            untraced_routes: vec!["/_status".to_string()],
            statsd_address: "127.0.0.1:9125".to_string(),
            log_json: false,
        }
    }
}
