//! Switchboard Runtime - orchestration layer for Switchboard.
//!
//! This crate provides:
//! - Layered configuration loading and validation (`config`)
//! - Logging setup on `tracing-subscriber` (`logging`)
//! - Runtime orchestration (`SwitchboardRuntime`): builds the HTTP fallback
//!   deliverer and the interaction adapter, then serves requests until
//!   shutdown
//!
//! ```ignore
//! use switchboard_runtime::SwitchboardRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = SwitchboardRuntime::new()?;
//!
//!     runtime.action("pick_color", |_payload, _respond| ())?;
//!
//!     // Run until Ctrl+C
//!     runtime.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, SwitchboardConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, SwitchboardRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros and span helpers.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
