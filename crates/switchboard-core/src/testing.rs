//! Test doubles shared by the unit tests of this crate.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::deliver::{BoxedDeliverer, FallbackDeliverer};
use crate::error::{DeliveryError, DeliveryResult};

/// Records every delivery as `(url, body)` on a channel.
pub(crate) struct RecordingDeliverer {
    tx: mpsc::UnboundedSender<(String, Value)>,
}

impl RecordingDeliverer {
    pub(crate) fn new() -> (BoxedDeliverer, mpsc::UnboundedReceiver<(String, Value)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl FallbackDeliverer for RecordingDeliverer {
    async fn deliver(&self, url: &str, body: &Value) -> DeliveryResult<()> {
        let _ = self.tx.send((url.to_string(), body.clone()));
        Ok(())
    }
}

/// Fails every delivery.
pub(crate) struct FailingDeliverer;

#[async_trait]
impl FallbackDeliverer for FailingDeliverer {
    async fn deliver(&self, _url: &str, _body: &Value) -> DeliveryResult<()> {
        Err(DeliveryError::Status {
            status: 404,
            body: "expired_url".to_string(),
        })
    }
}
