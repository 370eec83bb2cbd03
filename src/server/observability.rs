//! Request ids and request logging.

use super::DispatchServer;
use crate::{HttpMiddleware, utils::RequestIdGenerator};

use {
    axum::body::Body,
    http::{HeaderName, Request},
    tower_http::{
        request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
        trace::TraceLayer,
    },
};

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

impl DispatchServer {
    /// Gives every request an `x-request-id` (a UUIDv7 unless the client
    /// sent one) and copies it onto the response.
    #[must_use]
    pub fn setup_request_id(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::RequestId) {
            return self;
        }

        // Set must wrap Propagate so the id exists before it is copied back.
        let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
        self.inner = self
            .inner
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, RequestIdGenerator));
        self
    }

    /// Opens an `http_request` span per request with its method, URI and id.
    #[must_use]
    pub fn setup_logging(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::Logging) {
            return self;
        }

        self.inner = self.inner.layer(TraceLayer::new_for_http().make_span_with(
            |request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ));
        self
    }
}
