//! Test helpers for dispatcher tests
//!
//! - **Unit tests** (`src/dispatch/tests/`): trees routed in-process, either
//!   through [`Dispatcher::dispatch`] or through [`DispatchService`] with
//!   `oneshot()`
//! - **Integration tests** (`tests/`): a real server driven over the network
//!
//! ## Available Helpers
//!
//! - Request helpers: `request()`, `get()`
//! - Tree helpers: `capture_tree()`, `recorder()`, `handler_recording()`
//! - Response helpers: `dispatch_collect()`, `body_json()`, `body_string()`

use crate::{
    Dispatcher, Handler, Middleware, Request, Response, Router, StringPattern, handler_fn,
    middleware_fn,
};
use axum::body::Body;
use http::{Method, header};
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[cfg(test)]
pub(crate) mod errors;
#[cfg(test)]
pub(crate) mod routing;
#[cfg(test)]
pub(crate) mod service;

// ============================================================================
// Request Helpers
// ============================================================================

pub(crate) fn request(method: Method, url: &str) -> Request {
    Request::new(method, url.parse().expect("test URL"))
}

pub(crate) fn get(path: &str) -> Request {
    request(Method::GET, &format!("http://example.com{path}"))
}

pub(crate) fn with_accept(request: Request, accept: &'static str) -> Request {
    request.with_header(header::ACCEPT, header::HeaderValue::from_static(accept))
}

// ============================================================================
// Tree Helpers
// ============================================================================

pub(crate) type Log = Arc<Mutex<Vec<String>>>;

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Middleware appending `name` to `log`.
pub(crate) fn recorder(log: &Log, name: &'static str) -> impl Middleware + use<> {
    let log = log.clone();
    middleware_fn(move |_, _| {
        log.lock().unwrap().push(name.to_string());
        Box::pin(async { Ok(()) })
    })
}

/// Handler appending `name` to `log` and replying with `name` as text.
pub(crate) fn handler_recording(log: &Log, name: &'static str) -> impl Handler + use<> {
    let log = log.clone();
    handler_fn(move |_, response| {
        log.lock().unwrap().push(name.to_string());
        Box::pin(async move { response.set_text(name) })
    })
}

/// `/capture/<1-3 digits>` recording the captured count.
pub(crate) fn capture_tree(log: &Log) -> Router {
    let log = log.clone();
    let mut root = Router::new();
    root.attach_routers([
        Router::path("capture"),
        Router::path(
            StringPattern::regex(r"^\d{1,3}$")
                .unwrap()
                .capturing("count"),
        ),
    ])
    .attach_handler(handler_fn(move |request, response| {
        let count = request
            .routing_info()
            .get_parameter("count")
            .unwrap_or("<none>")
            .to_string();
        log.lock().unwrap().push(format!("count={count}"));
        Box::pin(async move { response.set_json(&serde_json::json!({ "count": count })) })
    }));
    root
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Dispatches and returns what reached the transport.
pub(crate) async fn dispatch_collect(
    dispatcher: &Dispatcher,
    mut request: Request,
) -> http::Response<Body> {
    let (mut response, delivered) = Response::channel();
    dispatcher.dispatch(&mut request, &mut response).await;
    if !response.is_sent() {
        response.send().unwrap();
    }
    delivered.await.expect("a response is delivered")
}

pub(crate) async fn body_string(response: http::Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub(crate) async fn body_json(response: http::Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
