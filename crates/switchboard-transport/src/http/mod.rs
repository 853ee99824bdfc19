//! HTTP transport.
//!
//! This module provides the fallback deliverer and the interaction listener.

#[cfg(feature = "http-client")]
mod client;
#[cfg(feature = "http-client")]
pub use client::{DEFAULT_DELIVERY_TIMEOUT, HttpDeliverer};

#[cfg(feature = "http-server")]
mod server;
#[cfg(feature = "http-server")]
pub use server::{ListenerHandle, listen, router};
