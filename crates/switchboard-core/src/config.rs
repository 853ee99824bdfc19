//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineConfigError, EngineConfigResult};

/// Default budget for the synchronous response, in milliseconds.
pub const DEFAULT_SYNC_RESPONSE_TIMEOUT_MS: u64 = 2500;

/// Smallest accepted synchronous response budget, in milliseconds.
pub const MIN_SYNC_RESPONSE_TIMEOUT_MS: u64 = 1;

/// Largest accepted synchronous response budget, in milliseconds.
///
/// The chat platform drops responses that take longer than three seconds.
pub const MAX_SYNC_RESPONSE_TIMEOUT_MS: u64 = 3000;

/// Per-adapter dispatch settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a deferred handler result may take before the response is
    /// finalized without it.
    pub sync_response_timeout_ms: u64,

    /// Whether results that miss the deadline are posted to `response_url`.
    pub late_response_fallback: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sync_response_timeout_ms: DEFAULT_SYNC_RESPONSE_TIMEOUT_MS,
            late_response_fallback: true,
        }
    }
}

impl EngineConfig {
    /// Sets the synchronous response budget.
    pub fn with_sync_response_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.sync_response_timeout_ms = timeout_ms;
        self
    }

    /// Enables or disables the late response fallback.
    pub fn with_late_response_fallback(mut self, enabled: bool) -> Self {
        self.late_response_fallback = enabled;
        self
    }

    /// The synchronous response budget as a [`Duration`].
    pub fn sync_response_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_response_timeout_ms)
    }

    /// Checks that the timeout lies within the accepted range.
    pub fn validate(&self) -> EngineConfigResult<()> {
        let range = MIN_SYNC_RESPONSE_TIMEOUT_MS..=MAX_SYNC_RESPONSE_TIMEOUT_MS;
        if !range.contains(&self.sync_response_timeout_ms) {
            return Err(EngineConfigError::SyncResponseTimeout {
                value: self.sync_response_timeout_ms,
                min: MIN_SYNC_RESPONSE_TIMEOUT_MS,
                max: MAX_SYNC_RESPONSE_TIMEOUT_MS,
            });
        }
        Ok(())
    }
}
