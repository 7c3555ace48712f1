//! Configuration loading from disk and environment.
//!
//! # Responsibilities
//! - Load and validate a TOML config file
//! - Apply environment-variable overrides on top of any base config
//!
//! # Design Decisions
//! - Missing file or unparseable values are fatal at startup, never
//!   silently defaulted; a service must not come up with trust counts
//!   it did not ask for

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::BaseConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: String, value: String },

    #[error("validation failed: {}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BaseConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: BaseConfig = toml::from_str(&content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build configuration from defaults plus environment overrides.
pub fn from_env() -> Result<BaseConfig, ConfigError> {
    apply_env(BaseConfig::default())
}

/// Apply environment-variable overrides to an existing configuration.
///
/// Recognized variables: `OTEL_SERVICE_NAME` (sets the service name and
/// enables tracing, mirroring the OpenTelemetry convention),
/// `BASE_X_FOR`, `BASE_X_ORIGINAL_FOR`, `BASE_X_PROTO`, `BASE_X_HOST`,
/// `BASE_X_PORT`, `BASE_X_PREFIX` (trust counts), `BASE_STATSD_ADDRESS`,
/// `BASE_UNTRACED_ROUTES` (comma-separated), `BASE_LOG_JSON`.
pub fn apply_env(mut config: BaseConfig) -> Result<BaseConfig, ConfigError> {
    if let Ok(name) = env::var("OTEL_SERVICE_NAME") {
        if !name.is_empty() {
            config.service_name = Some(name);
            config.observability.tracing_enabled = true;
        }
    }

    for (var, slot) in [
        ("BASE_X_FOR", &mut config.proxy.x_for),
        ("BASE_X_ORIGINAL_FOR", &mut config.proxy.x_original_for),
        ("BASE_X_PROTO", &mut config.proxy.x_proto),
        ("BASE_X_HOST", &mut config.proxy.x_host),
        ("BASE_X_PORT", &mut config.proxy.x_port),
        ("BASE_X_PREFIX", &mut config.proxy.x_prefix),
    ] {
        if let Ok(value) = env::var(var) {
            *slot = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value,
            })?;
        }
    }

    if let Ok(address) = env::var("BASE_STATSD_ADDRESS") {
        config.observability.statsd_address = address;
    }

    if let Ok(routes) = env::var("BASE_UNTRACED_ROUTES") {
        config.observability.untraced_routes = routes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    if let Ok(value) = env::var("BASE_LOG_JSON") {
        config.observability.log_json = match value.as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" | "" => false,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    var: "BASE_LOG_JSON".to_string(),
                    value,
                })
            }
        };
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
