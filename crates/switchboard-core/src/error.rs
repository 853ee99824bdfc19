//! Unified error types for the Switchboard core.
//!
//! Registration-time errors ([`InvalidConstraint`], [`EngineConfigError`]) are
//! returned to the caller and are expected to abort application startup.
//! Dispatch-time failures never surface as errors: they are mapped to a
//! status code or logged once the response cycle has closed.

use thiserror::Error;

/// A type-erased error produced by a handler.
///
/// Handlers may fail synchronously (mapped to status 500) or through their
/// deferred value (mapped to a generic text before the deadline, logged after).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Registration Errors
// =============================================================================

/// A handler registration carried a malformed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid constraint: {reason}")]
pub struct InvalidConstraint {
    /// What was wrong with the constraint.
    pub reason: String,
}

impl InvalidConstraint {
    /// Creates a new constraint error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors raised when an engine is constructed with an unusable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineConfigError {
    /// The synchronous response timeout is outside the accepted range.
    #[error("sync response timeout must be within {min}..={max} ms, got {value} ms")]
    SyncResponseTimeout {
        /// The rejected value.
        value: u64,
        /// Lower bound (inclusive).
        min: u64,
        /// Upper bound (inclusive).
        max: u64,
    },
}

// =============================================================================
// Delivery Errors
// =============================================================================

/// Errors that can occur while posting a message to a `response_url`.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// The request could not be sent or the connection failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The remote end answered with a non-success status.
    #[error("HTTP {status} error: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, if any.
        body: String,
    },

    /// The message could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DeliveryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// `respond` was called with a value that has not resolved yet.
///
/// The message is rejected before any delivery is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("respond requires a resolved message, got a pending value")]
pub struct MisuseError;

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for constraint normalization and validation.
pub type ConstraintResult<T> = Result<T, InvalidConstraint>;

/// Result type for engine configuration.
pub type EngineConfigResult<T> = Result<T, EngineConfigError>;

/// Result type for fallback deliveries.
pub type DeliveryResult<T> = Result<T, DeliveryError>;
