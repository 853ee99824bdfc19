//! Handler contracts.
//!
//! A handler runs synchronously when its entry matches and produces a
//! [`Reply`]:
//!
//! - [`Reply::Nothing`] or [`Reply::Value`]: the result is ignored and the
//!   caller gets the default empty response
//! - [`Reply::Deferred`]: the engine races the value against the response
//!   deadline
//!
//! Returning `Err` from the handler is a synchronous failure and yields a
//! status 500.
//!
//! Closures may return anything implementing [`IntoReply`]:
//!
//! ```rust,ignore
//! // Nothing to add to the response
//! adapter.action("ack", |_payload, _respond| ())?;
//!
//! // Resolve later; delivered inline or through `response_url`
//! adapter.action("pick_color", |_payload, _respond| {
//!     Reply::deferred(async {
//!         Ok::<_, BoxError>(json!({ "text": "picked red" }))
//!     })
//! })?;
//!
//! // Fail synchronously
//! adapter.action("broken", |_payload, _respond| Err::<(), _>("not ready"))?;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::error::BoxError;
use crate::payload::InteractionPayload;
use crate::respond::Respond;

/// A handler's deferred result.
pub type Deferred = BoxFuture<'static, Result<Value, BoxError>>;

/// What a handler produced when it was invoked.
pub enum Reply {
    /// No value.
    Nothing,
    /// A value available immediately.
    Value(Value),
    /// A value that resolves later.
    Deferred(Deferred),
}

impl Reply {
    /// Wraps a future into a deferred reply.
    ///
    /// The resolved value is serialized to JSON; a serialization failure
    /// counts as a rejection.
    pub fn deferred<F, T, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Serialize,
        E: Into<BoxError>,
    {
        Self::Deferred(
            async move {
                let value = future.await.map_err(Into::into)?;
                serde_json::to_value(value).map_err(Into::into)
            }
            .boxed(),
        )
    }

    /// Returns `true` if this reply has not resolved yet.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => f.write_str("Nothing"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::Value(Value::String(text.to_string()))
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Value(Value::String(text))
    }
}

// ============================================================================
// IntoReply
// ============================================================================

/// Types a handler may return.
///
/// `Err` means the handler failed synchronously.
pub trait IntoReply {
    /// Converts the handler's return value.
    fn into_reply(self) -> Result<Reply, BoxError>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(self)
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Nothing)
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Value(self))
    }
}

/// `None` produces nothing; `Some` defers to the inner value.
impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Result<Reply, BoxError> {
        self.map_or(Ok(Reply::Nothing), IntoReply::into_reply)
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<BoxError>,
{
    fn into_reply(self) -> Result<Reply, BoxError> {
        self.map_err(Into::into)?.into_reply()
    }
}

// ============================================================================
// Boxed handlers
// ============================================================================

/// A type-erased handler as stored in the registry.
///
/// Options handlers are stored in the same shape and ignore `respond`.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<InteractionPayload>, Option<Respond>) -> Result<Reply, BoxError> + Send + Sync>;

/// Boxes an action handler: `(payload, respond) -> reply`.
pub fn action_handler<F, R>(f: F) -> BoxedHandler
where
    F: Fn(Arc<InteractionPayload>, Option<Respond>) -> R + Send + Sync + 'static,
    R: IntoReply,
{
    Arc::new(move |payload, respond| f(payload, respond).into_reply())
}

/// Boxes an options handler: `(payload) -> reply`.
pub fn options_handler<F, R>(f: F) -> BoxedHandler
where
    F: Fn(Arc<InteractionPayload>) -> R + Send + Sync + 'static,
    R: IntoReply,
{
    Arc::new(move |payload, _respond| f(payload).into_reply())
}
