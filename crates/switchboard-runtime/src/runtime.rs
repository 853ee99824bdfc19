//! Runtime orchestration.
//!
//! The runtime turns a [`SwitchboardConfig`] into a running service: it sets
//! up logging, builds the HTTP fallback deliverer and the
//! [`InteractionAdapter`], collects handler registrations and finally serves
//! interaction requests until shutdown.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use switchboard_runtime::SwitchboardRuntime;
//!
//! let mut runtime = SwitchboardRuntime::builder()
//!     .config_file("config/switchboard.toml")
//!     .build()?;
//!
//! runtime.action("pick_color", |_payload, _respond| ())?;
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use switchboard_core::{
    BoxedDeliverer, ConstraintInput, InteractionAdapter, InteractionPayload, IntoReply, Respond,
};
use switchboard_transport::{HttpDeliverer, listen};

use crate::config::{ConfigLoader, SwitchboardConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// Owns the configuration and the adapter under construction.
///
/// Registration takes `&mut self`; [`run`](Self::run) consumes the runtime
/// and freezes the adapter before any request is served.
#[derive(Debug)]
pub struct SwitchboardRuntime {
    config: SwitchboardConfig,
    adapter: InteractionAdapter,
}

impl SwitchboardRuntime {
    /// Loads configuration from the current directory and environment.
    pub fn new() -> RuntimeResult<Self> {
        Self::builder().build()
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration, with the HTTP fallback deliverer.
    ///
    /// Validates the configuration and initializes logging.
    pub fn from_config(config: &SwitchboardConfig) -> RuntimeResult<Self> {
        let deliverer = HttpDeliverer::with_timeout(config.delivery.timeout())?;
        Self::with_deliverer(config, Arc::new(deliverer))
    }

    /// Creates a runtime from configuration with a custom deliverer.
    pub fn with_deliverer(
        config: &SwitchboardConfig,
        deliverer: BoxedDeliverer,
    ) -> RuntimeResult<Self> {
        validate_config(config)?;
        logging::init_from_config(&config.logging);

        let adapter = InteractionAdapter::with_config(config.engine, deliverer)?;

        info!(
            log_level = %config.logging.level,
            sync_response_timeout_ms = config.engine.sync_response_timeout_ms,
            late_response_fallback = config.engine.late_response_fallback,
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config: config.clone(),
            adapter,
        })
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &SwitchboardConfig {
        &self.config
    }

    /// Returns the adapter being built.
    pub fn adapter(&self) -> &InteractionAdapter {
        &self.adapter
    }

    /// Registers an action handler. See [`InteractionAdapter::action`].
    pub fn action<C, F, R>(&mut self, constraints: C, handler: F) -> RuntimeResult<&mut Self>
    where
        C: Into<ConstraintInput>,
        F: Fn(Arc<InteractionPayload>, Option<Respond>) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        self.adapter.action(constraints, handler)?;
        Ok(self)
    }

    /// Registers an options handler. See [`InteractionAdapter::options`].
    pub fn options<C, F, R>(&mut self, constraints: C, handler: F) -> RuntimeResult<&mut Self>
    where
        C: Into<ConstraintInput>,
        F: Fn(Arc<InteractionPayload>) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        self.adapter.options(constraints, handler)?;
        Ok(self)
    }

    /// Serves interaction requests until Ctrl+C or SIGTERM.
    pub async fn run(self) -> RuntimeResult<()> {
        info!("Switchboard is now running. Press Ctrl+C to stop.");
        self.run_until(wait_for_shutdown()).await
    }

    /// Serves interaction requests until `shutdown` completes.
    pub async fn run_until<F>(self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let server = &self.config.server;
        info!(
            handlers = self.adapter.registry().len(),
            "Starting interaction listener"
        );

        let adapter = Arc::new(self.adapter);
        let handle = listen(&server.addr(), &server.path, adapter).await?;

        shutdown.await;

        handle.shutdown().await;
        info!("Runtime stopped");

        Ok(())
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => error!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`SwitchboardRuntime`] with custom configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    deliverer: Option<BoxedDeliverer>,
}

impl RuntimeBuilder {
    /// Creates a builder that searches the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            deliverer: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: SwitchboardConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses a custom deliverer instead of the HTTP one.
    pub fn deliverer(mut self, deliverer: BoxedDeliverer) -> Self {
        self.deliverer = Some(deliverer);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<SwitchboardRuntime> {
        let config = self.config_loader.load()?;
        match self.deliverer {
            Some(deliverer) => SwitchboardRuntime::with_deliverer(&config, deliverer),
            None => SwitchboardRuntime::from_config(&config),
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
