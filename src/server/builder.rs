//! Orchestration: setup_middleware(), start(), serve() and router delegation.

use super::{
    DispatchServer,
    shutdown::{ShutdownPhase, shutdown_signal},
};
use crate::Result;

use {
    axum::{body::Body, routing::Route},
    http::Request,
    std::{convert::Infallible, net::SocketAddr},
    tokio::net::TcpListener,
    tower::{Layer, Service},
};

impl DispatchServer {
    /// Adds every layer the configuration enables.
    ///
    /// The last layer added runs first on an incoming request, so the order
    /// below is from the innermost to the outermost.
    #[must_use]
    pub fn setup_middleware(self) -> Self {
        const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");
        const VERSION: &str = env!("CARGO_PKG_VERSION");
        tracing::info!("Starting {PACKAGE_NAME} version {VERSION}...");

        self.setup_logging() // 1. Request span, sees the request id
            .setup_request_id() // 2. Request id, before anything logs
            .setup_catch_panic() // 3. Outermost, panic recovery
    }

    /// Binds the configured address and serves until shutdown.
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.http.full_bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Bound to {}", &bind_addr);
        self.serve(listener).await
    }

    /// Serves on an already bound listener until shutdown.
    ///
    /// Shutdown starts on SIGINT, SIGTERM or when the cancellation token is
    /// cancelled. In-flight requests then get `shutdown_timeout` to finish.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        tracing::info!("Waiting for connections");

        let service = self
            .inner
            .into_make_service_with_connect_info::<SocketAddr>();

        let shutdown_timeout = self.config.http.shutdown_timeout;
        let shutdown_notifier = self.shutdown_notifier.clone();
        let mut shutdown_rx = shutdown_notifier.subscribe();

        let serve_future = axum::serve(listener, service).with_graceful_shutdown(
            shutdown_signal(shutdown_timeout, shutdown_notifier.clone()),
        );

        // The grace period only starts once shutdown was initiated.
        tokio::select! {
            result = serve_future => {
                tracing::info!("Graceful shutdown completed");
                result?;
            }
            _ = async {
                loop {
                    match shutdown_rx.recv().await {
                        Ok(ShutdownPhase::Initiated) => break,
                        Ok(_) => continue,
                        Err(_) => std::future::pending::<()>().await,
                    }
                }
                tokio::time::sleep(shutdown_timeout).await;
            } => {
                tracing::warn!("Graceful shutdown timeout expired, forcing shutdown");
                shutdown_notifier.emit(ShutdownPhase::GracePeriodEnded);
            }
        }

        Ok(())
    }

    /// Adds a tower layer around everything added so far.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<Route> + Clone + Send + Sync + 'static,
        L::Service: Service<Request<Body>> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request<Body>>>::Response: axum::response::IntoResponse + 'static,
        <L::Service as Service<Request<Body>>>::Error: Into<Infallible> + 'static,
        <L::Service as Service<Request<Body>>>::Future: Send + 'static,
    {
        self.inner = self.inner.layer(layer);
        self
    }

    /// Serves `path` with an axum route before the dispatcher sees it.
    #[must_use]
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.inner = self.inner.route(path, route);
        self
    }

    pub fn into_inner(self) -> axum::Router {
        self.inner
    }
}
