//! The top of the routing tree and the error boundary.
//!
//! The [`Dispatcher`] owns the root [`Router`] and the [`DispatchPolicies`].
//! Every request goes through [`Dispatcher::dispatch`] exactly once, which
//! routes it under a deadline and turns any error into a client response:
//!
//! - a [`ClientAccessibleError`] is rendered from its own fields,
//! - anything else becomes a generic 500 `INTERNAL_SERVER_ERROR`; the
//!   original error is logged and never sent to the client.
//!
//! Errors are rendered as JSON unless the client's `Accept` header ranks
//! `text/html` strictly higher than `application/json`.
//!
//! [`DispatchService`] adapts a dispatcher to a `tower::Service` so it can be
//! mounted on an `axum::Router`.

mod policies;
mod render;
mod service;

#[cfg(test)]
mod tests;

pub use policies::*;
pub use render::html_fragment;
pub use service::*;

use {
    crate::{
        ClientAccessibleError, Config, Error, Handler, HttpConfig, Request, Response, Router,
        middleware::{Middleware, MiddlewareExecutor},
    },
    std::{fmt, sync::Arc, time::Duration},
};

pub struct Dispatcher {
    root: Router,
    policies: Arc<DispatchPolicies>,
    request_timeout: Option<Duration>,
}

impl Dispatcher {
    /// Creates a dispatcher with the default policies and request timeout.
    pub fn new(root: Router) -> Self {
        Self::with_policies(root, DispatchPolicies::default())
    }

    pub fn with_policies(root: Router, policies: DispatchPolicies) -> Self {
        Self {
            root,
            policies: Arc::new(policies),
            request_timeout: HttpConfig::default().request_timeout,
        }
    }

    /// Creates a dispatcher using the request timeout from `config`.
    pub fn from_config(root: Router, config: &Config) -> Self {
        Self::new(root).with_request_timeout(config.http.request_timeout)
    }

    /// Sets the deadline for a single dispatch. `None` disables it.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn root(&self) -> &Router {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Router {
        &mut self.root
    }

    /// Attaches a child to the root router and returns it.
    pub fn attach_router(&mut self, router: Router) -> &mut Router {
        self.root.attach_router(router)
    }

    pub fn policies(&self) -> &DispatchPolicies {
        &self.policies
    }

    /// Replaces the unhandled-request policy and returns the previous one.
    pub fn set_unhandled_request_handler(
        &mut self,
        handler: impl Handler + 'static,
    ) -> Arc<dyn Handler> {
        Arc::make_mut(&mut self.policies).replace_unhandled(Arc::new(handler))
    }

    /// Replaces the fulfillment policy and returns the previous one.
    pub fn set_request_fulfillment_checker<F>(&mut self, checker: F) -> FulfillmentChecker
    where
        F: Fn(&Request, &Response) -> bool + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.policies).replace_fulfillment(Arc::new(checker))
    }

    /// Routes one request through the tree and renders any error.
    ///
    /// Never fails: routing errors are rendered into `response`, or only
    /// logged when the response was already sent.
    pub async fn dispatch(&self, request: &mut Request, response: &mut Response) {
        request.set_policies(Arc::clone(&self.policies));
        tracing::debug!(method = %request.method(), url = %request.url(), "Dispatching request");

        let routed = match self.request_timeout {
            Some(deadline) => {
                let outcome = tokio::time::timeout(deadline, self.root.route(request, response)).await;
                match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(
                            url = %request.url(),
                            deadline_ms = deadline.as_millis() as u64,
                            "Request timed out"
                        );
                        Err(ClientAccessibleError::request_timeout(deadline).into())
                    }
                }
            }
            None => self.root.route(request, response).await,
        };

        if let Err(error) = routed {
            self.send_error(request, response, error);
        }
    }

    /// Renders `error` into `response` and sends it.
    ///
    /// Non client-accessible errors are logged with their cause and replaced
    /// by a generic internal server error.
    pub fn send_error(&self, request: &Request, response: &mut Response, error: impl Into<Error>) {
        let client = error.into().into_client_error();

        match client.cause() {
            Some(cause) => tracing::error!(
                url = %request.url(),
                message = %client.message(),
                cause = %cause,
                "Request failed with an internal error"
            ),
            None => tracing::info!(
                url = %request.url(),
                status = client.status().as_u16(),
                title = %client.title(),
                "Request failed with a client error"
            ),
        }

        if response.is_sent() {
            tracing::error!(
                url = %request.url(),
                title = %client.title(),
                "Response already sent, error cannot be rendered"
            );
            return;
        }

        let sent = render::render_error(request, response, &client).and_then(|()| response.send());
        if let Err(err) = sent {
            tracing::error!(error = %err, "Failed to send error response");
        }
    }
}

impl MiddlewareExecutor for Dispatcher {
    fn attach_middleware_at_beginning(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.root.attach_middleware_at_beginning(middleware);
        self
    }

    fn attach_middleware_before_handler(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.root.attach_middleware_before_handler(middleware);
        self
    }

    fn attach_middleware_after_handler(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.root.attach_middleware_after_handler(middleware);
        self
    }

    fn attach_middleware_at_end(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.root.attach_middleware_at_end(middleware);
        self
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Router::new())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("root", &self.root)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
