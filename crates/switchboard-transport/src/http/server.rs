//! Interaction request listener.
//!
//! The platform posts interactions as `application/x-www-form-urlencoded`
//! with a single `payload` field holding the JSON payload. Endpoint probes
//! arrive as `ssl_check=1` and are acknowledged without dispatching.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use switchboard_core::{Content, DispatchResult, InteractionAdapter, InteractionPayload};

use crate::error::{TransportError, TransportResult};

/// Builds a router serving interaction requests on `path`.
pub fn router(adapter: Arc<InteractionAdapter>, path: &str) -> Router {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    Router::new()
        .route(&path, post(interaction_handler))
        .with_state(adapter)
}

/// Binds `addr` and serves interaction requests on `path` in the background.
pub async fn listen(
    addr: &str,
    path: &str,
    adapter: Arc<InteractionAdapter>,
) -> TransportResult<ListenerHandle> {
    let router = router(adapter, path);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TransportError::BindFailed {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
    let local_addr = listener.local_addr()?;

    info!(addr = %local_addr, path = %path, "Interaction listener started");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
            info!("Interaction listener shutting down");
        });
        if let Err(e) = server.await {
            error!(error = %e, "Interaction listener error");
        }
    });

    Ok(ListenerHandle {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

/// Handle to a running listener. Dropping it stops the listener.
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting requests and waits for in-flight ones to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Interaction listener task failed");
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn interaction_handler(
    State(adapter): State<Arc<InteractionAdapter>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let Form(mut fields) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected malformed interaction request");
            return (StatusCode::BAD_REQUEST, "malformed request body").into_response();
        }
    };

    if fields.contains_key("ssl_check") {
        trace!("Answered ssl check");
        return StatusCode::OK.into_response();
    }

    let Some(raw) = fields.remove("payload") else {
        warn!("Interaction request without a payload field");
        return (StatusCode::BAD_REQUEST, "missing payload").into_response();
    };

    let payload: InteractionPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Interaction payload is not valid JSON");
            return (StatusCode::BAD_REQUEST, "malformed payload").into_response();
        }
    };

    trace!(callback_id = %payload.callback_id, "Received interaction");
    render(adapter.dispatch(payload).await).await
}

/// Turns a dispatch result into an HTTP response, awaiting pending content.
async fn render(result: DispatchResult) -> Response {
    let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match result.content {
        None => status.into_response(),
        Some(Content::Ready(value)) => render_value(status, value),
        Some(Content::Pending(pending)) => {
            debug!("Holding the request open for a pending result");
            match pending.await {
                Ok(value) => render_value(status, value),
                Err(e) => {
                    error!(error = %e, "Pending result rejected");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
    }
}

fn render_value(status: StatusCode, value: Value) -> Response {
    match value {
        Value::Null => status.into_response(),
        Value::String(text) => (status, text).into_response(),
        other => (status, Json(other)).into_response(),
    }
}
