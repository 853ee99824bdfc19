//! The `respond` capability handed to action handlers.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde_json::Value;
use tracing::{debug, trace};

use crate::deliver::BoxedDeliverer;
use crate::error::{DeliveryResult, MisuseError};
use crate::handler::Reply;

/// A delivery that has been accepted and runs when awaited.
pub type Delivery = BoxFuture<'static, DeliveryResult<()>>;

/// Sends a message to the `response_url` of the interaction being handled.
///
/// Only created when the payload carried a `response_url`. Clones share the
/// URL and may send any number of times; the platform enforces its own limit
/// on how often a `response_url` accepts messages.
///
/// ```rust,ignore
/// adapter.action("pick_color", |_payload, respond| {
///     Reply::deferred(async move {
///         if let Some(respond) = respond {
///             respond.send(json!({ "text": "working on it" }))?.await?;
///         }
///         Ok::<_, BoxError>(json!({ "text": "picked red" }))
///     })
/// })?;
/// ```
#[derive(Clone)]
pub struct Respond {
    url: Arc<str>,
    deliverer: BoxedDeliverer,
}

impl Respond {
    pub(crate) fn new(url: &str, deliverer: BoxedDeliverer) -> Self {
        Self {
            url: Arc::from(url),
            deliverer,
        }
    }

    /// The URL messages are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Accepts a message for delivery.
    ///
    /// A [`Reply::Deferred`] is rejected right away with [`MisuseError`] and
    /// nothing is sent. [`Reply::Nothing`] yields a delivery that sends nothing.
    pub fn send(&self, message: impl Into<Reply>) -> Result<Delivery, MisuseError> {
        match message.into() {
            Reply::Deferred(_) => Err(MisuseError),
            Reply::Nothing => {
                trace!(url = %self.url, "Nothing to deliver");
                Ok(future::ready(Ok(())).boxed())
            }
            Reply::Value(body) => Ok(self.deliver(body)),
        }
    }

    pub(crate) fn deliver(&self, body: Value) -> Delivery {
        let url = Arc::clone(&self.url);
        let deliverer = Arc::clone(&self.deliverer);
        async move {
            debug!(url = %url, "Posting message to response url");
            deliverer.deliver(&url, &body).await
        }
        .boxed()
    }
}

impl fmt::Debug for Respond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Respond").field("url", &self.url).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDeliverer;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_posts_to_url() {
        let (deliverer, mut rx) = RecordingDeliverer::new();
        let respond = Respond::new("https://hooks.example.com/1", deliverer);

        respond
            .send(json!({ "text": "done" }))
            .unwrap()
            .await
            .unwrap();

        let (url, body) = rx.recv().await.unwrap();
        assert_eq!(url, "https://hooks.example.com/1");
        assert_eq!(body, json!({ "text": "done" }));
    }

    #[tokio::test]
    async fn test_send_rejects_pending_value() {
        let (deliverer, mut rx) = RecordingDeliverer::new();
        let respond = Respond::new("https://hooks.example.com/1", deliverer);

        let pending = Reply::deferred(async { Ok::<_, crate::BoxError>(json!({})) });
        assert!(matches!(respond.send(pending), Err(MisuseError)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_can_be_repeated() {
        let (deliverer, mut rx) = RecordingDeliverer::new();
        let respond = Respond::new("https://hooks.example.com/1", deliverer);
        let copy = respond.clone();

        respond.send(json!({ "text": "working" })).unwrap().await.unwrap();
        copy.send(json!({ "text": "done" })).unwrap().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().1, json!({ "text": "working" }));
        assert_eq!(rx.recv().await.unwrap().1, json!({ "text": "done" }));
    }

    #[tokio::test]
    async fn test_send_nothing_delivers_nothing() {
        let (deliverer, mut rx) = RecordingDeliverer::new();
        let respond = Respond::new("https://hooks.example.com/1", deliverer);

        respond.send(Reply::Nothing).unwrap().await.unwrap();
        assert!(rx.try_recv().is_err());
    }
}
