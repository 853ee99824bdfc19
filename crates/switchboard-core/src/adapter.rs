//! The interaction adapter: registration API plus dispatch.
//!
//! ```rust,ignore
//! use switchboard_core::{InteractionAdapter, Reply, BoxError};
//!
//! let mut adapter = InteractionAdapter::new(deliverer);
//! adapter
//!     .action("pick_color", |_payload, _respond| {
//!         Reply::deferred(async { Ok::<_, BoxError>(json!({ "text": "picked red" })) })
//!     })?
//!     .options("color_menu", |_payload| json!({ "options": [] }))?;
//!
//! let adapter = Arc::new(adapter);
//! let result = adapter.dispatch(payload).await;
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::config::EngineConfig;
use crate::constraint::{self, ConstraintInput};
use crate::deliver::BoxedDeliverer;
use crate::dispatch::{DispatchEngine, DispatchResult};
use crate::error::{ConstraintResult, EngineConfigResult};
use crate::handler::{IntoReply, action_handler, options_handler};
use crate::payload::InteractionPayload;
use crate::registry::{CallbackRegistry, EntryKind};
use crate::respond::Respond;
use crate::validation;

/// Owns a callback registry and the engine that dispatches against it.
///
/// Build it during setup with [`action`](Self::action) and
/// [`options`](Self::options), then share it (typically behind an [`Arc`])
/// to serve traffic.
#[derive(Debug, Clone)]
pub struct InteractionAdapter {
    registry: CallbackRegistry,
    engine: DispatchEngine,
}

impl InteractionAdapter {
    /// Creates an adapter with the default configuration.
    pub fn new(deliverer: BoxedDeliverer) -> Self {
        Self {
            registry: CallbackRegistry::new(),
            engine: DispatchEngine::with_defaults(deliverer),
        }
    }

    /// Creates an adapter with a custom configuration.
    pub fn with_config(config: EngineConfig, deliverer: BoxedDeliverer) -> EngineConfigResult<Self> {
        Ok(Self {
            registry: CallbackRegistry::new(),
            engine: DispatchEngine::new(config, deliverer)?,
        })
    }

    /// Registers an action handler.
    ///
    /// The constraint's `type`, if any, must be `select`, `button` or
    /// `dialog_submission`. Nothing is stored when validation fails.
    pub fn action<C, F, R>(&mut self, constraints: C, handler: F) -> ConstraintResult<&mut Self>
    where
        C: Into<ConstraintInput>,
        F: Fn(Arc<InteractionPayload>, Option<Respond>) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        let constraints = constraint::normalize(constraints.into())?;
        validation::action_type(&constraints)?;

        debug!(constraints = ?constraints, "Registering action handler");
        self.registry
            .register(constraints, action_handler(handler), EntryKind::Action);
        Ok(self)
    }

    /// Registers an options handler. The constraint's `type` is not restricted.
    pub fn options<C, F, R>(&mut self, constraints: C, handler: F) -> ConstraintResult<&mut Self>
    where
        C: Into<ConstraintInput>,
        F: Fn(Arc<InteractionPayload>) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        let constraints = constraint::normalize(constraints.into())?;

        debug!(constraints = ?constraints, "Registering options handler");
        self.registry
            .register(constraints, options_handler(handler), EntryKind::Options);
        Ok(self)
    }

    /// Routes a payload to its handler and resolves the response.
    pub async fn dispatch(&self, payload: InteractionPayload) -> DispatchResult {
        self.engine.dispatch(&self.registry, payload).await
    }

    /// The registered callbacks.
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }
}
