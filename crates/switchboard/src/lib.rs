//! # Switchboard
//!
//! Routing and response handling for interactive chat messages: button
//! clicks, menu selections, dynamic menu option requests and dialog
//! submissions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────────┐     ┌───────────┐
//! │  Listener   │────▶│  InteractionAdapter  │────▶│  Handler  │
//! │   (axum)    │◀────│ (registry + engine)  │     └───────────┘
//! └─────────────┘     └──────────────────────┘
//!                               │ deadline missed
//!                               ▼
//!                     ┌──────────────────────┐
//!                     │ HttpDeliverer (POST  │
//!                     │ to response_url)     │
//!                     └──────────────────────┘
//! ```
//!
//! - **Runtime**: configuration, logging, listener lifecycle
//! - **Core**: constraint matching, first-match routing, the response race
//! - **Transport**: the axum listener and the reqwest fallback deliverer
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchboard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = SwitchboardRuntime::new()?;
//!
//!     runtime.action("pick_color", |payload, _respond| {
//!         let user = payload.extra.get("user").cloned();
//!         Reply::deferred(async move {
//!             Ok::<_, BoxError>(json!({ "text": "Color saved", "user": user }))
//!         })
//!     })?;
//!
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use switchboard_core as core;
pub use switchboard_runtime as runtime;
pub use switchboard_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use switchboard::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use switchboard_runtime::{
        RuntimeError, RuntimeResult, SwitchboardConfig, SwitchboardRuntime,
    };

    // Registration and dispatch
    pub use switchboard_core::prelude::*;
    pub use switchboard_core::{DeliveryError, IntoReply, InvalidConstraint, MisuseError};

    // Logging
    pub use switchboard_runtime::prelude::*;
}
