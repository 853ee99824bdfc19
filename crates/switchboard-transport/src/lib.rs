//! # Switchboard Transport
//!
//! HTTP plumbing around the Switchboard core.
//!
//! ## Features
//!
//! - `http-client`: [`HttpDeliverer`], the `reqwest` implementation of
//!   [`FallbackDeliverer`](switchboard_core::FallbackDeliverer) used for late
//!   responses
//! - `http-server`: the `axum` listener that accepts interaction requests and
//!   hands them to an [`InteractionAdapter`](switchboard_core::InteractionAdapter)
//! - `full`: both
//!
//! ## Architecture
//!
//! ```text
//!        platform                          platform
//!           │ POST payload=…                  ▲ POST response_url
//!           ▼                                 │
//! ┌───────────────────┐              ┌────────────────┐
//! │ interaction       │              │ HttpDeliverer  │
//! │ listener (axum)   │              │ (reqwest)      │
//! ├───────────────────┴──────────────┴────────────────┤
//! │             switchboard-core (dispatch)           │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchboard_transport::{HttpDeliverer, listen};
//!
//! let deliverer = Arc::new(HttpDeliverer::new()?);
//! let mut adapter = InteractionAdapter::new(deliverer);
//! adapter.action("pick_color", |_payload, _respond| ())?;
//!
//! let handle = listen("0.0.0.0:3000", "/slack/actions", Arc::new(adapter)).await?;
//! ```

pub mod error;

// Transport implementations (feature-gated)
#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;

pub use error::{TransportError, TransportResult};

#[cfg(feature = "http-client")]
pub use http::HttpDeliverer;

#[cfg(feature = "http-server")]
pub use http::{ListenerHandle, listen, router};
