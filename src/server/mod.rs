//! Serving a [`Dispatcher`] over HTTP.
//!
//! [`DispatchServer`] wraps an `axum::Router` whose fallback is a
//! [`DispatchService`]. Its `setup_*` methods add the tower layers the
//! configuration enables, and [`DispatchServer::start`] serves until a
//! shutdown is requested:
//!
//! - [`observability`] - request ids and the per-request trace span
//! - [`control`] - panic recovery
//! - [`builder`] - layer orchestration, serving and router delegation
//! - [`shutdown`] - graceful shutdown phases

mod builder;
mod control;
mod observability;
mod shutdown;


pub use shutdown::{ShutdownNotifier, ShutdownPhase};

use {
    crate::{Config, DispatchService, Dispatcher, HttpMiddleware, Result, Router},
    std::sync::Arc,
    tokio::sync::{broadcast, mpsc},
    tokio_util::sync::CancellationToken,
};

pub struct DispatchServer {
    pub(crate) config: Config,
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) inner: axum::Router,
    pub(crate) panic_channel: Option<mpsc::Sender<String>>,
    pub(crate) shutdown_notifier: ShutdownNotifier,
}

impl DispatchServer {
    /// Validates `config` and serves `root` through a dispatcher using the
    /// configured request timeout.
    pub fn new(config: Config, root: Router) -> Result<Self> {
        let dispatcher = Dispatcher::from_config(root, &config);
        Self::with_dispatcher(config, dispatcher)
    }

    /// Validates `config` and serves an already configured dispatcher.
    pub fn with_dispatcher(config: Config, dispatcher: impl Into<Arc<Dispatcher>>) -> Result<Self> {
        config.validate()?;

        let dispatcher = dispatcher.into();
        let inner = axum::Router::new().fallback_service(DispatchService::new(Arc::clone(&dispatcher)));

        Ok(Self {
            config,
            dispatcher,
            inner,
            panic_channel: None,
            shutdown_notifier: ShutdownNotifier::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    #[must_use]
    pub fn shutdown_notifier(&self) -> &ShutdownNotifier {
        &self.shutdown_notifier
    }

    /// Cancelled when shutdown starts. Cancelling it starts the shutdown.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown_notifier.cancellation_token()
    }

    #[must_use]
    pub fn subscribe_to_shutdown(&self) -> broadcast::Receiver<ShutdownPhase> {
        self.shutdown_notifier.subscribe()
    }

    /// Sends the message of every recovered panic to `ch`.
    #[must_use]
    pub fn with_panic_notification_channel(self, ch: mpsc::Sender<String>) -> Self {
        Self {
            panic_channel: Some(ch),
            ..self
        }
    }

    pub(crate) fn is_middleware_enabled(&self, middleware: HttpMiddleware) -> bool {
        self.config.http.is_middleware_enabled(middleware)
    }
}

impl std::fmt::Debug for DispatchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchServer")
            .field("bind_addr", &self.config.http.full_bind_addr())
            .field("dispatcher", &self.dispatcher)
            .field("shutdown_notifier", &self.shutdown_notifier)
            .finish_non_exhaustive()
    }
}
