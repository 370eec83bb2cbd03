//! # axum-dispatch
//!
//! A request dispatcher built around a tree of routers, served through Axum
//! and Tokio.
//!
//! Every request is decomposed into a [`RoutingInfo`] (TLD, domain,
//! subdomains and path segments, each with a consumption cursor) and routed
//! down a tree of [`Router`]s. Each router may match, capture a value,
//! delegate to the first matching child, or handle the request itself, with
//! ordered [`Middleware`] around it. The [`Dispatcher`] at the top is the
//! error boundary: errors become JSON or HTML client responses and internal
//! details never leave the server.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum_dispatch::{Config, DispatchServer, Result, Router, StringPattern, handler_fn};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::default(); // Loads from config/{RUST_ENV}.toml
//!     config.setup_tracing();
//!
//!     let mut root = Router::new();
//!     root.attach_routers([
//!         Router::path("capture"),
//!         Router::path(StringPattern::regex(r"^\d{1,3}$")?.capturing("count")),
//!     ])
//!     .attach_handler(handler_fn(|request, response| {
//!         Box::pin(async move {
//!             let count = request.routing_info().get_parameter("count").unwrap_or_default();
//!             response.set_text(format!("count = {count}"))
//!         })
//!     }));
//!
//!     DispatchServer::new(config, root)?
//!         .setup_middleware()
//!         .start()
//!         .await
//! }
//! ```
//!
//! With `config/dev.toml`:
//! ```toml
//! [http]
//! bind_port = 3000
//! request_timeout = "10s"
//! ```
//!
//! Run with `RUST_ENV=dev cargo run`.
//!
//! # Routing
//!
//! | Step | What happens |
//! |------|--------------|
//! | enter | the matcher's capture is stored and its route hook runs |
//! | pre-handler middleware | in order, until one sends the response |
//! | delegate | the first child whose matcher applies is entered |
//! | conclude | the handler runs if the request is fulfilled, else the unhandled-request policy |
//! | post-handler middleware | in order, until the response is sent |
//!
//! By default a request is fulfilled once its whole path is consumed, and an
//! unhandled request fails with `RESOURCE_NOT_FOUND` (404) when segments are
//! left or `METHOD_NOT_ALLOWED` (405) otherwise. Both policies can be replaced
//! on the [`Dispatcher`].
//!
//! # Errors
//!
//! Handlers and middleware return [`Result`]. A [`ClientAccessibleError`] is
//! rendered as is:
//!
//! ```json
//! {
//!   "error": {
//!     "title": "RESOURCE_NOT_FOUND",
//!     "developerMessage": "The specified resource (located at: '/missing') could not be found.",
//!     "userMessage": "Resource not found!"
//!   }
//! }
//! ```
//!
//! Any other error is logged and replaced by a generic
//! `INTERNAL_SERVER_ERROR`.
//!
//! # Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | `routing` | [`RoutingInfo`], [`Matcher`]s, [`Handler`]s and the [`Router`] tree |
//! | `middleware` | [`Middleware`] and the per-router [`MiddlewareManager`] |
//! | `messages` | the [`Request`] and [`Response`] passed through the tree |
//! | `dispatch` | the [`Dispatcher`], its policies and the [`DispatchService`] |
//! | `server` | [`DispatchServer`] and graceful shutdown |
//! | `config` | configuration loading and validation ([`Config`]) |
//! | `error` | error types ([`Error`], [`ClientAccessibleError`]) |
//!
//! ## Middleware Control
//!
//! The server's tower layers can be switched off individually:
//!
//! ```toml
//! [http]
//! exclude = ["catch-panic"]
//! ```
mod config;
mod dispatch;
mod error;
mod messages;
mod middleware;
mod routing;
mod server;
mod utils;

pub use config::*;
pub use dispatch::*;
pub use error::*;
pub use messages::*;
pub use middleware::*;
pub use routing::*;
pub use server::*;
pub use utils::*;

pub type Result<T, E = Error> = std::result::Result<T, E>;
