use super::*;
use crate::DispatchService;
use http::StatusCode;
use tower::ServiceExt;

fn http_request(uri: &str) -> http::Request<Body> {
    http::Request::builder()
        .uri(uri)
        .header(header::HOST, "example.com")
        .body(Body::empty())
        .unwrap()
}

// ============================================================================
// Tower Service
// ============================================================================

#[tokio::test]
async fn test_service_dispatches_capture() {
    let log = Log::default();
    let service = DispatchService::new(Dispatcher::new(capture_tree(&log)));

    let response = service.oneshot(http_request("/capture/42")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["count"], "42");
    assert_eq!(entries(&log), ["count=42"]);
}

#[tokio::test]
async fn test_service_sends_unsent_response() {
    let mut root = Router::new();
    root.attach_handler(handler_fn(|_, response| {
        Box::pin(async move {
            response.set_status(StatusCode::ACCEPTED)?;
            response.set_text("queued")
        })
    }));
    let service = DispatchService::new(Dispatcher::new(root));

    let response = service.oneshot(http_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_string(response).await, "queued");
}

#[tokio::test]
async fn test_service_renders_not_found() {
    let service = DispatchService::new(Dispatcher::default());

    let response = service.oneshot(http_request("/missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["title"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_service_rejects_bad_host() {
    let service = DispatchService::new(Dispatcher::default());
    let request = http::Request::builder()
        .uri("/")
        .header(header::HOST, "bad host name")
        .body(Body::empty())
        .unwrap();

    let response = service.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["title"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_service_host_cannot_rewrite_routed_path() {
    let log = Log::default();
    let service = DispatchService::new(Dispatcher::new(capture_tree(&log)));
    let request = http::Request::builder()
        .uri("/missing")
        .header(header::HOST, "example.com/capture/42?")
        .body(Body::empty())
        .unwrap();

    let response = service.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_service_host_cannot_swap_domain_with_user_info() {
    let log = Log::default();
    let mut root = Router::new();
    root.attach_router(Router::domain("evil.com"))
        .attach_handler(handler_recording(&log, "evil"));
    let service = DispatchService::new(Dispatcher::new(root));
    let request = http::Request::builder()
        .uri("/")
        .header(header::HOST, "good.com@evil.com")
        .body(Body::empty())
        .unwrap();

    let response = service.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["title"], "BAD_REQUEST");
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_service_reads_request_body() {
    let mut root = Router::new();
    root.attach_handler(handler_fn(|request, response| {
        Box::pin(async move {
            let text = request.body_text().await?;
            response.set_text(text.to_uppercase())
        })
    }));
    let service = DispatchService::new(Dispatcher::new(root));
    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::HOST, "example.com")
        .body(Body::from("shout"))
        .unwrap();

    let response = service.oneshot(request).await.unwrap();

    assert_eq!(body_string(response).await, "SHOUT");
}

#[tokio::test]
async fn test_service_as_axum_fallback() {
    let log = Log::default();
    let app = axum::Router::new()
        .route("/health", axum::routing::get(|| async { "ok" }))
        .fallback_service(DispatchService::new(Dispatcher::new(capture_tree(&log))));

    let health = app.clone().oneshot(http_request("/health")).await.unwrap();
    let captured = app.oneshot(http_request("/capture/3")).await.unwrap();

    assert_eq!(body_string(health).await, "ok");
    assert_eq!(captured.status(), StatusCode::OK);
    assert_eq!(entries(&log), ["count=3"]);
}

#[test]
fn test_service_shares_dispatcher() {
    let service = DispatchService::new(Dispatcher::default());
    let clone = service.clone();
    assert!(Arc::ptr_eq(service.dispatcher(), clone.dispatcher()));
}
