//! HTTP fallback deliverer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use switchboard_core::{DeliveryError, DeliveryResult, FallbackDeliverer};

use crate::error::{TransportError, TransportResult};

/// Default timeout for a single fallback request.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts late responses to `response_url` with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpDeliverer {
    client: Client,
}

impl HttpDeliverer {
    /// Creates a deliverer with [`DEFAULT_DELIVERY_TIMEOUT`].
    pub fn new() -> TransportResult<Self> {
        Self::with_timeout(DEFAULT_DELIVERY_TIMEOUT)
    }

    /// Creates a deliverer with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FallbackDeliverer for HttpDeliverer {
    async fn deliver(&self, url: &str, body: &Value) -> DeliveryResult<()> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Io(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Response url rejected the message");
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(url = %url, status = status.as_u16(), "Message posted to response url");
        Ok(())
    }
}
