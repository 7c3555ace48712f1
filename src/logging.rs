//! Structured logging initialization.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber at process start
//! - JSON output for production, human-readable for development
//!
//! # Design Decisions
//! - Log level comes from `RUST_LOG`, defaulting to `info`
//! - Safe to call more than once; later calls are no-ops, which keeps
//!   test binaries that initialize per-test from panicking

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::BaseConfig;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
}

/// Install the global subscriber according to the configuration.
pub fn init(config: &BaseConfig) {
    if config.observability.log_json {
        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    }

    if let Some(service) = &config.service_name {
        tracing::info!(service = %service, "logging initialized");
    }
}
