//! The dispatch engine.
//!
//! [`DispatchEngine::dispatch`] routes a payload to the first matching entry,
//! invokes its handler, and reconciles the handler's result with the
//! synchronous response deadline:
//!
//! ```text
//!            ┌── no entry ───────────────────────────────▶ 200 ""
//! payload ───┤
//!            └── handler ──┬── Err ─────────────────────▶ 500
//!                          ├── value / nothing ─────────▶ 200 ""
//!                          └── deferred ── race ──┬── resolved ─▶ 200 value
//!                                                 ├── rejected ─▶ 200 generic text
//!                                                 └── deadline ─┬── fallback ─▶ 200 "" + late POST
//!                                                               └── otherwise ▶ 200 pending
//! ```
//!
//! The late continuation of the fallback branch runs as a detached task; its
//! failures are only logged because the response cycle has already closed.
//!
//! A handler that panics counts as a failure: synchronously it yields a 500,
//! once deferred it is treated like a rejection.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use serde_json::Value;
use tokio::time::{Instant, sleep_until};
use tracing::{Instrument, debug, debug_span, error, trace, warn};

use crate::config::EngineConfig;
use crate::deliver::BoxedDeliverer;
use crate::error::{BoxError, EngineConfigResult};
use crate::handler::{Deferred, Reply};
use crate::payload::InteractionPayload;
use crate::registry::CallbackRegistry;
use crate::respond::Respond;

/// Content returned when a deferred handler result rejects before the deadline.
pub const GENERIC_ERROR_TEXT: &str = "Sorry, something went wrong while handling your request.";

/// Status of a normal response.
pub const STATUS_OK: u16 = 200;

/// Status of a synchronous handler failure.
pub const STATUS_HANDLER_FAILED: u16 = 500;

// ============================================================================
// DispatchResult
// ============================================================================

/// A handler result that missed the deadline and has no fallback channel.
///
/// Resolves whenever the handler settles; the HTTP layer keeps the request
/// open until then.
pub struct PendingContent(Deferred);

impl Future for PendingContent {
    type Output = Result<Value, BoxError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().0.as_mut().poll(cx)
    }
}

impl fmt::Debug for PendingContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PendingContent(..)")
    }
}

/// The body of a [`DispatchResult`].
#[derive(Debug)]
pub enum Content {
    /// A concrete value: a string or any JSON value.
    Ready(Value),
    /// A value still being computed.
    Pending(PendingContent),
}

impl Content {
    /// Returns the concrete value, if there is one.
    pub fn as_ready(&self) -> Option<&Value> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending(_) => None,
        }
    }

    /// Returns `true` if the value is still being computed.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// The outcome of a dispatch: a status and an optional body.
#[derive(Debug)]
pub struct DispatchResult {
    /// HTTP-style status code.
    pub status: u16,
    /// Response body. `None` only for synchronous handler failures.
    pub content: Option<Content>,
}

impl DispatchResult {
    /// `200` with an empty string: nothing to add.
    pub fn empty() -> Self {
        Self::ready(Value::String(String::new()))
    }

    /// `200` with a concrete value.
    pub fn ready(value: Value) -> Self {
        Self {
            status: STATUS_OK,
            content: Some(Content::Ready(value)),
        }
    }

    /// `500` without content.
    pub fn failed() -> Self {
        Self {
            status: STATUS_HANDLER_FAILED,
            content: None,
        }
    }

    fn pending(deferred: Deferred) -> Self {
        Self {
            status: STATUS_OK,
            content: Some(Content::Pending(PendingContent(deferred))),
        }
    }

    /// Returns `true` for the default `200 ""` result.
    pub fn is_empty(&self) -> bool {
        self.status == STATUS_OK
            && matches!(&self.content, Some(Content::Ready(Value::String(s))) if s.is_empty())
    }
}

/// The stages a single dispatch may end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// No entry accepted the payload.
    NoMatch,
    /// The handler failed synchronously.
    SyncThrow,
    /// The handler produced a concrete value or nothing.
    SyncValue,
    /// The handler produced a deferred value; the race is starting.
    AsyncPending,
    /// The deferred value settled before the deadline.
    AsyncResolvedBeforeDeadline,
    /// The deadline passed; the value will be posted to `response_url`.
    AsyncTimeoutWithFallback,
    /// The deadline passed; the value stays pending in the response.
    AsyncTimeoutNoFallback,
}

impl DispatchState {
    /// Returns the state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMatch => "no_match",
            Self::SyncThrow => "sync_throw",
            Self::SyncValue => "sync_value",
            Self::AsyncPending => "async_pending",
            Self::AsyncResolvedBeforeDeadline => "async_resolved_before_deadline",
            Self::AsyncTimeoutWithFallback => "async_timeout_with_fallback",
            Self::AsyncTimeoutNoFallback => "async_timeout_no_fallback",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DispatchEngine
// ============================================================================

/// Invokes matched handlers and races deferred results against the deadline.
#[derive(Clone)]
pub struct DispatchEngine {
    config: EngineConfig,
    deliverer: BoxedDeliverer,
}

impl DispatchEngine {
    /// Creates an engine, rejecting an out-of-range timeout.
    pub fn new(config: EngineConfig, deliverer: BoxedDeliverer) -> EngineConfigResult<Self> {
        config.validate()?;
        Ok(Self { config, deliverer })
    }

    /// Creates an engine with [`EngineConfig::default`].
    pub fn with_defaults(deliverer: BoxedDeliverer) -> Self {
        Self {
            config: EngineConfig::default(),
            deliverer,
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Dispatches a payload against `registry`.
    pub async fn dispatch(
        &self,
        registry: &CallbackRegistry,
        payload: InteractionPayload,
    ) -> DispatchResult {
        let span = debug_span!("dispatch", callback_id = %payload.callback_id);
        self.dispatch_inner(registry, payload).instrument(span).await
    }

    async fn dispatch_inner(
        &self,
        registry: &CallbackRegistry,
        payload: InteractionPayload,
    ) -> DispatchResult {
        let Some(entry) = registry.find(&payload) else {
            debug!(state = %DispatchState::NoMatch, "No callback registered for payload");
            return DispatchResult::empty();
        };

        let payload = Arc::new(payload);
        let respond = payload
            .response_url
            .as_deref()
            .map(|url| Respond::new(url, Arc::clone(&self.deliverer)));

        let called = panic::catch_unwind(AssertUnwindSafe(|| {
            entry.call(Arc::clone(&payload), respond.clone())
        }));

        let deferred = match called {
            Err(panic) => {
                error!(
                    state = %DispatchState::SyncThrow,
                    panic_msg = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                return DispatchResult::failed();
            }
            Ok(Err(error)) => {
                error!(state = %DispatchState::SyncThrow, error = %error, "Handler failed");
                return DispatchResult::failed();
            }
            Ok(Ok(Reply::Deferred(deferred))) => deferred,
            Ok(Ok(_)) => {
                debug!(state = %DispatchState::SyncValue, "Handler returned without a deferred value");
                return DispatchResult::empty();
            }
        };

        self.race(deferred, &payload, respond).await
    }

    /// Races the deferred value against the deadline.
    ///
    /// The select is biased toward the handler, so a value that is ready when
    /// the deadline fires still wins.
    async fn race(
        &self,
        deferred: Deferred,
        payload: &InteractionPayload,
        respond: Option<Respond>,
    ) -> DispatchResult {
        let deadline = Instant::now() + self.config.sync_response_timeout();
        trace!(
            state = %DispatchState::AsyncPending,
            timeout_ms = self.config.sync_response_timeout_ms,
            "Racing deferred value against the deadline"
        );
        let mut deferred = catch_panics(deferred);

        tokio::select! {
            biased;
            settled = &mut deferred => {
                let state = DispatchState::AsyncResolvedBeforeDeadline;
                return match settled {
                    Ok(value) => {
                        debug!(state = %state, "Deferred value resolved in time");
                        DispatchResult::ready(value)
                    }
                    Err(error) => {
                        warn!(state = %state, error = %error, "Deferred value rejected in time");
                        DispatchResult::ready(Value::String(GENERIC_ERROR_TEXT.to_string()))
                    }
                };
            }
            () = sleep_until(deadline) => {}
        }

        let fallback = respond
            .filter(|_| self.config.late_response_fallback && !payload.is_dialog_submission());

        match fallback {
            Some(respond) => {
                debug!(
                    state = %DispatchState::AsyncTimeoutWithFallback,
                    timeout_ms = self.config.sync_response_timeout_ms,
                    "Deadline passed, result will be posted to response url"
                );
                let span = debug_span!("late_response", url = %respond.url());
                tokio::spawn(deliver_late(deferred, respond).instrument(span));
                DispatchResult::empty()
            }
            None => {
                // TODO: bound the wait with a hard upper timeout once callers agree on one.
                warn!(
                    state = %DispatchState::AsyncTimeoutNoFallback,
                    timeout_ms = self.config.sync_response_timeout_ms,
                    "Deadline passed without a fallback channel, response left pending"
                );
                DispatchResult::pending(deferred)
            }
        }
    }
}

impl fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Turns a panic inside the deferred value into a rejection.
fn catch_panics(deferred: Deferred) -> Deferred {
    AssertUnwindSafe(deferred)
        .catch_unwind()
        .map(|settled| match settled {
            Ok(result) => result,
            Err(panic) => Err(BoxError::from(format!(
                "Handler panicked: {}",
                panic_message(panic.as_ref())
            ))),
        })
        .boxed()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Awaits a result that missed the deadline and posts it to `response_url`.
///
/// A result of `null` (a handler resolving to `()`) posts nothing.
async fn deliver_late(deferred: Deferred, respond: Respond) {
    let value = match deferred.await {
        Ok(Value::Null) => {
            trace!("Late result is empty, nothing to deliver");
            return;
        }
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Handler rejected after the response deadline");
            return;
        }
    };

    match respond.deliver(value).await {
        Ok(()) => debug!("Late response delivered"),
        Err(error) => error!(error = %error, "Late response delivery failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraints;
    use crate::handler::action_handler;
    use crate::registry::EntryKind;
    use crate::testing::{FailingDeliverer, RecordingDeliverer};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    const RESPONSE_URL: &str = "https://hooks.example.com/actions/T1/1";

    fn pick_color(delay_ms: u64) -> crate::handler::BoxedHandler {
        action_handler(move |_, _| {
            Reply::deferred(async move {
                sleep(Duration::from_millis(delay_ms)).await;
                Ok::<_, BoxError>(json!({ "text": "picked red" }))
            })
        })
    }

    fn registry_with(handler: crate::handler::BoxedHandler) -> CallbackRegistry {
        let mut registry = CallbackRegistry::new();
        registry.register(
            Constraints::new().callback_id("pick_color"),
            handler,
            EntryKind::Action,
        );
        registry
    }

    fn engine(config: EngineConfig) -> (DispatchEngine, tokio::sync::mpsc::UnboundedReceiver<(String, Value)>) {
        let (deliverer, rx) = RecordingDeliverer::new();
        (DispatchEngine::new(config, deliverer).unwrap(), rx)
    }

    #[test]
    fn test_new_rejects_out_of_range_timeout() {
        let (deliverer, _rx) = RecordingDeliverer::new();
        let config = EngineConfig::default().with_sync_response_timeout_ms(5000);
        assert!(DispatchEngine::new(config, deliverer).is_err());
    }

    #[tokio::test]
    async fn test_no_match_returns_empty() {
        let (engine, _rx) = engine(EngineConfig::default());
        let registry = registry_with(pick_color(0));

        let result = engine
            .dispatch(&registry, InteractionPayload::new("other"))
            .await;
        assert!(result.is_empty());

        let result = engine
            .dispatch(&CallbackRegistry::new(), InteractionPayload::new("pick_color"))
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_sync_failure_returns_500_without_content() {
        let (engine, mut rx) = engine(EngineConfig::default().with_sync_response_timeout_ms(1));
        let registry = registry_with(action_handler(|_, _| Err::<(), _>("boom")));

        let payload = InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;

        assert_eq!(result.status, 500);
        assert!(result.content.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sync_value_is_ignored() {
        let (engine, mut rx) = engine(EngineConfig::default());
        let registry = registry_with(action_handler(|_, _| json!({ "text": "ignored" })));

        let payload = InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;

        assert!(result.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_resolves_before_deadline() {
        let (engine, mut rx) = engine(EngineConfig::default());
        let registry = registry_with(pick_color(100));

        let result = engine
            .dispatch(&registry, InteractionPayload::new("pick_color"))
            .await;

        assert_eq!(result.status, 200);
        assert_eq!(
            result.content.unwrap().as_ready(),
            Some(&json!({ "text": "picked red" }))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_before_deadline_hides_detail() {
        let (engine, _rx) = engine(EngineConfig::default());
        let registry = registry_with(action_handler(|_, _| {
            Reply::deferred(async {
                sleep(Duration::from_millis(10)).await;
                Err::<Value, _>("database is down")
            })
        }));

        let result = engine
            .dispatch(&registry, InteractionPayload::new("pick_color"))
            .await;

        assert_eq!(result.status, 200);
        assert_eq!(
            result.content.unwrap().as_ready(),
            Some(&json!(GENERIC_ERROR_TEXT))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_with_fallback_posts_late() {
        let (engine, mut rx) = engine(EngineConfig::default());
        let registry = registry_with(pick_color(3000));

        let started = Instant::now();
        let payload = InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;

        assert!(result.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(2500));
        assert!(started.elapsed() < Duration::from_millis(3000));
        assert!(rx.try_recv().is_err());

        let (url, body) = rx.recv().await.unwrap();
        assert_eq!(url, RESPONSE_URL);
        assert_eq!(body, json!({ "text": "picked red" }));
        assert!(started.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dialog_submission_stays_pending() {
        let (engine, mut rx) = engine(EngineConfig::default());
        let registry = registry_with(pick_color(3000));

        let payload = InteractionPayload::new("pick_color")
            .with_kind("dialog_submission")
            .with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;

        assert_eq!(result.status, 200);
        let Some(Content::Pending(pending)) = result.content else {
            panic!("expected pending content");
        };
        assert_eq!(pending.await.unwrap(), json!({ "text": "picked red" }));
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_without_response_url_stays_pending() {
        let (engine, _rx) = engine(EngineConfig::default());
        let registry = registry_with(pick_color(3000));

        let result = engine
            .dispatch(&registry, InteractionPayload::new("pick_color"))
            .await;
        assert!(result.content.as_ref().is_some_and(Content::is_pending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_with_fallback_disabled_stays_pending() {
        let (engine, mut rx) =
            engine(EngineConfig::default().with_late_response_fallback(false));
        let registry = registry_with(pick_color(3000));

        let payload = InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;

        let Some(Content::Pending(pending)) = result.content else {
            panic!("expected pending content");
        };
        pending.await.unwrap();
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_rejection_is_not_delivered() {
        let (engine, mut rx) = engine(EngineConfig::default().with_sync_response_timeout_ms(100));
        let registry = registry_with(action_handler(|_, _| {
            Reply::deferred(async {
                sleep(Duration::from_millis(500)).await;
                Err::<Value, _>("too late and broken")
            })
        }));

        let payload = InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;
        assert!(result.is_empty());

        sleep(Duration::from_millis(1000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_empty_result_is_not_delivered() {
        let (engine, mut rx) = engine(EngineConfig::default().with_sync_response_timeout_ms(100));
        let registry = registry_with(action_handler(|_, _| {
            Reply::deferred(async {
                sleep(Duration::from_millis(500)).await;
                Ok::<_, BoxError>(())
            })
        }));

        let payload = InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;
        assert!(result.is_empty());

        sleep(Duration::from_millis(1000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sync_panic_returns_500_without_content() {
        let (engine, mut rx) = engine(EngineConfig::default());
        let registry = registry_with(action_handler(|_, _| {
            let colors: Vec<Value> = Vec::new();
            colors[0].clone()
        }));

        let payload = InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;

        assert_eq!(result.status, 500);
        assert!(result.content.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_panic_before_deadline_hides_detail() {
        let (engine, _rx) = engine(EngineConfig::default());
        let registry = registry_with(action_handler(|_, _| {
            Reply::deferred(async {
                sleep(Duration::from_millis(10)).await;
                let colors: Vec<Value> = Vec::new();
                Ok::<_, BoxError>(colors[0].clone())
            })
        }));

        let result = engine
            .dispatch(&registry, InteractionPayload::new("pick_color"))
            .await;

        assert_eq!(result.status, 200);
        assert_eq!(
            result.content.unwrap().as_ready(),
            Some(&json!(GENERIC_ERROR_TEXT))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_panic_after_deadline_is_contained() {
        let (engine, mut rx) = engine(EngineConfig::default().with_sync_response_timeout_ms(100));
        let registry = registry_with(action_handler(|_, _| {
            Reply::deferred(async {
                sleep(Duration::from_millis(500)).await;
                let colors: Vec<Value> = Vec::new();
                Ok::<_, BoxError>(colors[0].clone())
            })
        }));

        let payload = InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;
        assert!(result.is_empty());

        sleep(Duration::from_millis(1000)).await;
        assert!(rx.try_recv().is_err());

        let result = engine
            .dispatch(&registry, InteractionPayload::new("pick_color"))
            .await;
        assert!(result.content.as_ref().is_some_and(Content::is_pending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_panic_rejects() {
        let (engine, _rx) = engine(EngineConfig::default().with_sync_response_timeout_ms(100));
        let registry = registry_with(action_handler(|_, _| {
            Reply::deferred(async {
                sleep(Duration::from_millis(500)).await;
                let colors: Vec<Value> = Vec::new();
                Ok::<_, BoxError>(colors[0].clone())
            })
        }));

        let result = engine
            .dispatch(&registry, InteractionPayload::new("pick_color"))
            .await;
        let Some(Content::Pending(pending)) = result.content else {
            panic!("expected pending content");
        };
        let error = pending.await.unwrap_err();
        assert!(error.to_string().contains("index out of bounds"));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(DispatchState::AsyncPending.to_string(), "async_pending");
        assert_eq!(
            DispatchState::AsyncTimeoutNoFallback.as_str(),
            "async_timeout_no_fallback"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_delivery_failure_is_contained() {
        let engine = DispatchEngine::new(
            EngineConfig::default().with_sync_response_timeout_ms(100),
            Arc::new(FailingDeliverer),
        )
        .unwrap();
        let registry = registry_with(pick_color(500));

        let payload = InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL);
        let result = engine.dispatch(&registry, payload).await;
        assert!(result.is_empty());

        // The failure only reaches the log; the engine keeps serving.
        sleep(Duration::from_millis(1000)).await;
        let result = engine
            .dispatch(&registry, InteractionPayload::new("other"))
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_value_wins_tie_with_deadline() {
        let (engine, _rx) = engine(EngineConfig::default().with_sync_response_timeout_ms(100));
        let registry = registry_with(pick_color(100));

        let result = engine
            .dispatch(&registry, InteractionPayload::new("pick_color"))
            .await;
        assert_eq!(
            result.content.unwrap().as_ready(),
            Some(&json!({ "text": "picked red" }))
        );
    }

    #[tokio::test]
    async fn test_handler_receives_respond_only_with_url() {
        let with_respond = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&with_respond);
        let registry = registry_with(action_handler(move |_, respond: Option<Respond>| {
            if respond.is_some() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));
        let (engine, _rx) = engine(EngineConfig::default());

        engine
            .dispatch(&registry, InteractionPayload::new("pick_color"))
            .await;
        engine
            .dispatch(
                &registry,
                InteractionPayload::new("pick_color").with_response_url(RESPONSE_URL),
            )
            .await;

        assert_eq!(with_respond.load(Ordering::SeqCst), 1);
    }
}
