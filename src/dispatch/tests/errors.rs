use super::*;
use crate::{ClientAccessibleError, Error, ResponseSink};
use http::StatusCode;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_test::traced_test;

#[derive(Clone, Default)]
struct CountingSink(Arc<AtomicUsize>);

impl ResponseSink for CountingSink {
    fn deliver(&mut self, _response: http::Response<Body>) -> crate::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn failing_root(error: impl Fn() -> Error + Send + Sync + 'static) -> Router {
    let mut root = Router::new();
    root.attach_handler(handler_fn(move |_, _| {
        let error = error();
        Box::pin(async move { Err(error) })
    }));
    root
}

fn conflict() -> ClientAccessibleError {
    ClientAccessibleError::new(
        StatusCode::CONFLICT,
        "NAME_TAKEN",
        "A user named 'bob' already exists.",
        "That name is taken!",
    )
    .with_extra("name", "bob")
}

// ============================================================================
// JSON Rendering
// ============================================================================

#[tokio::test]
async fn test_client_error_json_document() {
    let dispatcher = Dispatcher::new(failing_root(|| conflict().into()));

    let response =
        dispatch_collect(&dispatcher, with_accept(get("/"), "application/json")).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(
        body_json(response).await,
        json!({
            "error": {
                "title": "NAME_TAKEN",
                "developerMessage": "A user named 'bob' already exists.",
                "userMessage": "That name is taken!",
                "name": "bob"
            }
        })
    );
}

#[tokio::test]
async fn test_json_is_the_default_without_accept() {
    let dispatcher = Dispatcher::new(failing_root(|| conflict().into()));

    let response = dispatch_collect(&dispatcher, get("/")).await;

    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
}

#[tokio::test]
async fn test_extras_override_standard_fields() {
    let dispatcher = Dispatcher::new(failing_root(|| {
        conflict().with_extra("title", "OVERRIDDEN").into()
    }));

    let response = dispatch_collect(&dispatcher, get("/")).await;

    assert_eq!(body_json(response).await["error"]["title"], "OVERRIDDEN");
}

// ============================================================================
// HTML Rendering
// ============================================================================

#[tokio::test]
async fn test_browser_gets_html() {
    let dispatcher = Dispatcher::new(failing_root(|| conflict().into()));
    let accept = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

    let response = dispatch_collect(&dispatcher, with_accept(get("/"), accept)).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    let body = body_string(response).await;
    assert!(body.contains("<h1>409 Name Taken</h1>"));
    assert!(body.contains("That name is taken!"));
    assert!(!body.contains("already exists"));
}

#[tokio::test]
async fn test_not_found_as_html() {
    let dispatcher = Dispatcher::new(Router::new());

    let response =
        dispatch_collect(&dispatcher, with_accept(get("/nowhere"), "text/html")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(
        body_string(response)
            .await
            .contains("<h1>404 Resource Not Found</h1>")
    );
}

// ============================================================================
// Internal Errors
// ============================================================================

#[tokio::test]
async fn test_internal_error_is_hidden() {
    let dispatcher =
        Dispatcher::new(failing_root(|| Error::internal("database password is hunter2")));

    let response =
        dispatch_collect(&dispatcher, with_accept(get("/"), "application/json")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["title"], "INTERNAL_SERVER_ERROR");
    assert!(!body.to_string().contains("hunter2"));
}

#[tokio::test]
async fn test_wrapped_cause_is_not_serialized() {
    let dispatcher = Dispatcher::new(failing_root(|| {
        ClientAccessibleError::internal(
            "loading the profile failed",
            std::io::Error::other("disk /dev/sda1 is gone"),
        )
        .into()
    }));

    let response = dispatch_collect(&dispatcher, get("/")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await.to_string();
    assert!(!body.contains("sda1"));
    assert!(!body.contains("loading the profile"));
}

#[tokio::test]
#[traced_test]
async fn test_internal_error_is_logged_with_cause() {
    let dispatcher =
        Dispatcher::new(failing_root(|| Error::config("no handler for the thing")));

    dispatch_collect(&dispatcher, get("/")).await;

    assert!(logs_contain("Request failed with an internal error"));
    assert!(logs_contain("no handler for the thing"));
}

// ============================================================================
// Already Sent
// ============================================================================

#[tokio::test]
#[traced_test]
async fn test_error_after_send_is_only_logged() {
    let mut root = Router::new();
    root.attach_handler(handler_fn(|_, response| {
        Box::pin(async move {
            response.set_text("partial")?;
            response.send()?;
            Err(Error::internal("failed after the response went out"))
        })
    }));
    let dispatcher = Dispatcher::new(root);
    let sink = CountingSink::default();
    let writes = sink.0.clone();

    let mut request = get("/");
    let mut response = Response::new(sink);
    dispatcher.dispatch(&mut request, &mut response).await;

    assert_eq!(writes.load(Ordering::SeqCst), 1);
    assert_eq!(response.status(), StatusCode::OK);
    assert!(logs_contain("Response already sent"));
}

#[tokio::test]
async fn test_send_error_directly() {
    let dispatcher = Dispatcher::default();
    let request = get("/direct");
    let (mut response, delivered) = Response::channel();

    dispatcher.send_error(
        &request,
        &mut response,
        ClientAccessibleError::not_found("user", "42"),
    );

    assert!(response.is_sent());
    let delivered = delivered.await.unwrap();
    assert_eq!(delivered.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(delivered).await["error"]["title"], "USER_NOT_FOUND");
}
