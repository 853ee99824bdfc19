//! Runtime error types.

use thiserror::Error;

use switchboard_core::{EngineConfigError, InvalidConstraint};
use switchboard_transport::TransportError;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The engine rejected its configuration.
    #[error("Engine configuration error: {0}")]
    Engine(#[from] EngineConfigError),

    /// A handler registration was rejected.
    #[error("Registration error: {0}")]
    Registration(#[from] InvalidConstraint),

    /// The deliverer or listener could not be set up.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
