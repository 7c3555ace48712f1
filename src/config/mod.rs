//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) and/or environment variables
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → BaseConfig (validated, immutable)
//!     → handed to constructors at process start
//! ```
//!
//! # Design Decisions
//! - Config is an explicitly constructed object passed to constructors,
//!   never a module-level mutable global
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env, from_env, load_config, ConfigError};
pub use schema::{BaseConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
