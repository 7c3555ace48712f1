//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: BaseConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::BaseConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The statsd address is not a valid socket address.
    InvalidStatsdAddress(String),
    /// An untraced route does not start with `/`.
    InvalidUntracedRoute(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidStatsdAddress(addr) => {
                write!(f, "statsd_address {addr:?} is not a socket address")
            }
            ValidationError::InvalidUntracedRoute(route) => {
                write!(f, "untraced route {route:?} must start with '/'")
            }
        }
    }
}

/// Check cross-field constraints serde cannot express.
pub fn validate_config(config: &BaseConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config
        .observability
        .statsd_address
        .parse::<SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::InvalidStatsdAddress(
            config.observability.statsd_address.clone(),
        ));
    }

    for route in &config.observability.untraced_routes {
        if !route.starts_with('/') {
            errors.push(ValidationError::InvalidUntracedRoute(route.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BaseConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = BaseConfig::default();
        config.observability.statsd_address = "nope".to_string();
        config.observability.untraced_routes = vec!["healthz".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::InvalidStatsdAddress("nope".into())));
        assert!(errors.contains(&ValidationError::InvalidUntracedRoute(
            "healthz".into()
        )));
    }
}
