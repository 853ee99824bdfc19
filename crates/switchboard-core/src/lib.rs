//! # Switchboard Core
//!
//! The routing and response engine for interactive chat messages.
//!
//! When a user clicks a button, picks from a menu or submits a dialog, the
//! chat platform posts an interaction payload and expects an answer within
//! three seconds. This crate decides which handler owns the payload and how
//! its result reaches the user.
//!
//! ## Layers
//!
//! - **Registration**: [`Constraints`] are normalized from several input
//!   shapes ([`ConstraintInput`]) and validated before they are stored
//! - **Matching**: the [`CallbackRegistry`] keeps entries in registration
//!   order and returns the first one whose constraints accept the payload
//! - **Dispatch**: the [`DispatchEngine`] invokes the handler and races a
//!   deferred result against the synchronous deadline
//!
//! ## Response Race
//!
//! ```text
//!                       ┌──────────── before deadline ──────────▶ inline content
//! payload ─▶ handler ─▶ │
//!                       └──── after deadline ──┬─ response_url ─▶ late POST
//!                                              └─ otherwise ────▶ pending content
//! ```
//!
//! Out-of-band posting goes through a [`FallbackDeliverer`], so the core never
//! opens connections itself.
//!
//! ## Example
//!
//! ```rust,ignore
//! use switchboard_core::prelude::*;
//!
//! let mut adapter = InteractionAdapter::new(deliverer);
//! adapter.action("pick_color", |payload, _respond| {
//!     let choice = payload.first_action_type().unwrap_or("none").to_string();
//!     Reply::deferred(async move {
//!         Ok::<_, BoxError>(json!({ "text": format!("picked {choice}") }))
//!     })
//! })?;
//!
//! let result = adapter.dispatch(payload).await;
//! assert_eq!(result.status, 200);
//! ```

pub mod adapter;
pub mod config;
pub mod constraint;
pub mod deliver;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod payload;
pub mod registry;
pub mod respond;
pub mod validation;

#[cfg(test)]
mod testing;

pub use adapter::InteractionAdapter;
pub use config::{
    DEFAULT_SYNC_RESPONSE_TIMEOUT_MS, EngineConfig, MAX_SYNC_RESPONSE_TIMEOUT_MS,
    MIN_SYNC_RESPONSE_TIMEOUT_MS,
};
pub use constraint::{CallbackId, ConstraintInput, Constraints, normalize};
pub use deliver::{BoxedDeliverer, FallbackDeliverer};
pub use dispatch::{
    Content, DispatchEngine, DispatchResult, DispatchState, GENERIC_ERROR_TEXT, PendingContent,
};
pub use error::{
    BoxError, ConstraintResult, DeliveryError, DeliveryResult, EngineConfigError,
    EngineConfigResult, InvalidConstraint, MisuseError,
};
pub use handler::{BoxedHandler, Deferred, IntoReply, Reply};
pub use payload::{Action, InteractionPayload};
pub use registry::{CallbackEntry, CallbackRegistry, EntryKind};
pub use respond::{Delivery, Respond};

/// Commonly used types for registering and dispatching interactions.
pub mod prelude {
    pub use crate::{
        Action, BoxError, CallbackId, Constraints, Content, DispatchResult, EngineConfig,
        FallbackDeliverer, InteractionAdapter, InteractionPayload, Reply, Respond,
    };
}
