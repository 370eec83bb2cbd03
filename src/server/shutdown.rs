//! Graceful shutdown notifications.
//!
//! A [`ShutdownNotifier`] is shared by the server and anything that needs to
//! react to it going down:
//!
//! - the [`CancellationToken`] is cancelled as soon as shutdown starts. It is
//!   enough for background tasks that just need to stop.
//! - [`ShutdownNotifier::subscribe`] yields every [`ShutdownPhase`] in order,
//!   for components whose cleanup depends on the stage.
//!
//! Shutdown starts on SIGINT, SIGTERM, or when the token is cancelled by the
//! application itself.
//!
//! ```rust,no_run
//! use axum_dispatch::{Config, DispatchServer, Router, ShutdownPhase};
//!
//! # async fn example() -> axum_dispatch::Result<()> {
//! let server = DispatchServer::new(Config::default(), Router::new())?;
//! let mut phases = server.subscribe_to_shutdown();
//!
//! tokio::spawn(async move {
//!     while let Ok(phase) = phases.recv().await {
//!         if let ShutdownPhase::GracePeriodStarted { timeout } = phase {
//!             tracing::info!("{}s left to drain", timeout.as_secs());
//!         }
//!     }
//! });
//!
//! server.setup_middleware().start().await
//! # }
//! ```

use std::time::Duration;
use tokio::{signal, sync::broadcast};
use tokio_util::sync::CancellationToken;

/// The stages of a graceful shutdown, emitted in this order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShutdownPhase {
    /// A shutdown was requested. No new connections are accepted and the
    /// cancellation token is cancelled.
    Initiated,

    /// In-flight requests are draining for at most `timeout`.
    GracePeriodStarted { timeout: Duration },

    /// The grace period expired before all requests finished.
    GracePeriodEnded,
}

/// Broadcasts [`ShutdownPhase`]s and owns the shutdown [`CancellationToken`].
///
/// Clones share the same channel and token.
#[derive(Clone)]
pub struct ShutdownNotifier {
    sender: broadcast::Sender<ShutdownPhase>,
    cancel_token: CancellationToken,
}

impl ShutdownNotifier {
    /// `capacity` is the number of phases buffered per lagging subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Subscribers only see phases emitted after they subscribed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownPhase> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    #[must_use]
    pub fn is_shutdown_initiated(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Sends `phase` to every subscriber and returns how many received it.
    ///
    /// [`ShutdownPhase::Initiated`] also cancels the token.
    pub(crate) fn emit(&self, phase: ShutdownPhase) -> usize {
        if phase == ShutdownPhase::Initiated {
            self.cancel_token.cancel();
        }
        self.sender.send(phase).unwrap_or(0)
    }
}

impl Default for ShutdownNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

impl std::fmt::Debug for ShutdownNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownNotifier")
            .field("subscriber_count", &self.sender.receiver_count())
            .field("is_shutdown_initiated", &self.is_shutdown_initiated())
            .finish()
    }
}

/// Resolves once shutdown is requested, after emitting `Initiated` and
/// `GracePeriodStarted`.
pub(crate) async fn shutdown_signal(timeout: Duration, notifier: ShutdownNotifier) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::debug!("Ctrl+C signal received"),
            Err(err) => {
                tracing::warn!("Failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut handler) => {
                handler.recv().await;
                tracing::debug!("SIGTERM signal received");
            }
            Err(err) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let token = notifier.cancellation_token();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = token.cancelled() => tracing::debug!("Shutdown requested by the application"),
    }

    tracing::info!(
        "Starting graceful shutdown (timeout: {}s)",
        timeout.as_secs()
    );
    let subscribers = notifier.emit(ShutdownPhase::Initiated);
    tracing::debug!("Shutdown initiated, {} subscriber(s) notified", subscribers);

    notifier.emit(ShutdownPhase::GracePeriodStarted { timeout });
}
