//! The out-of-band delivery seam.
//!
//! The core never opens connections itself. Posting a message to a
//! `response_url` goes through a [`FallbackDeliverer`]; the HTTP
//! implementation lives in `switchboard-transport` behind the `http-client`
//! feature.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DeliveryResult;

/// Posts a JSON body to a URL supplied by an interaction.
///
/// Each call is independent: no connection affinity, no backpressure. A
/// failure is returned to the caller, which in fire-and-forget use only logs it.
#[async_trait]
pub trait FallbackDeliverer: Send + Sync {
    /// Sends `body` to `url` with a single POST.
    async fn deliver(&self, url: &str, body: &Value) -> DeliveryResult<()>;
}

/// A shared, type-erased deliverer.
pub type BoxedDeliverer = Arc<dyn FallbackDeliverer>;
