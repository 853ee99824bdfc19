//! Configuration module for the Switchboard runtime.
//!
//! This module provides layered configuration loading (files, environment,
//! programmatic overrides) and validation for the engine, the fallback
//! deliverer, the interaction listener and logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    DeliveryConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, ServerConfig,
    SpanEventConfig, SwitchboardConfig,
};
pub use validation::validate_config;
