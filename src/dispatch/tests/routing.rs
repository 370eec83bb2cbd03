use super::*;
use crate::{MatchResult, Matcher, MiddlewareExecutor, RoutingInfo, SupplierMatcher};
use http::StatusCode;

// ============================================================================
// Parameters and Cursors
// ============================================================================

#[tokio::test]
async fn test_parameters_from_several_levels() {
    let mut root = Router::new();
    root.attach_routers([
        Router::subdomain(StringPattern::predicate(|_| true).capturing("tenant")),
        Router::path("users"),
        Router::path(StringPattern::regex(r"^\d+$").unwrap().capturing("id")),
    ])
    .attach_handler(handler_fn(|request, response| {
        let info = request.routing_info();
        let body = format!(
            "{}:{}",
            info.get_parameter("tenant").unwrap_or_default(),
            info.get_parameter("id").unwrap_or_default()
        );
        Box::pin(async move { response.set_text(body) })
    }));
    let dispatcher = Dispatcher::new(root);

    let response = dispatch_collect(
        &dispatcher,
        request(Method::GET, "http://acme.example.com/users/17"),
    )
    .await;

    assert_eq!(body_string(response).await, "acme:17");
}

#[tokio::test]
async fn test_trailing_slash_does_not_add_segment() {
    let log = Log::default();
    let dispatcher = Dispatcher::new(capture_tree(&log));

    let response = dispatch_collect(&dispatcher, get("/capture/5/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(entries(&log), ["count=5"]);
}

#[tokio::test]
async fn test_case_insensitive_segment() {
    let log = Log::default();
    let mut root = Router::new();
    root.attach_router(Router::path(StringPattern::exact_ignore_case("About")))
        .attach_handler(handler_recording(&log, "about"));
    let dispatcher = Dispatcher::new(root);

    dispatch_collect(&dispatcher, get("/ABOUT")).await;
    dispatch_collect(&dispatcher, get("/about")).await;

    assert_eq!(entries(&log), ["about", "about"]);
}

// ============================================================================
// Custom Matchers
// ============================================================================

/// Matches when a header is present and captures its value.
struct HeaderMatcher {
    name: &'static str,
}

impl Matcher for HeaderMatcher {
    fn evaluate(&self, request: &Request, _response: &Response) -> MatchResult {
        match request.header(self.name) {
            Some(value) => MatchResult::hit(value),
            None => MatchResult::miss(),
        }
    }

    fn parameter(&self) -> Option<&str> {
        Some(self.name)
    }
}

#[tokio::test]
async fn test_custom_matcher_capture() {
    let mut root = Router::new();
    root.attach_router(Router::with_matcher(HeaderMatcher { name: "x-api-key" }))
        .attach_handler(handler_fn(|request, response| {
            let key = request
                .routing_info()
                .get_parameter("x-api-key")
                .unwrap_or_default()
                .to_string();
            Box::pin(async move { response.set_text(key) })
        }));
    root.attach_handler(handler_fn(|_, response| {
        Box::pin(async move { response.set_text("anonymous") })
    }));
    let dispatcher = Dispatcher::new(root);

    let keyed = get("/").with_header(
        header::HeaderName::from_static("x-api-key"),
        header::HeaderValue::from_static("secret"),
    );
    let with_key = dispatch_collect(&dispatcher, keyed).await;
    let without_key = dispatch_collect(&dispatcher, get("/")).await;

    assert_eq!(body_string(with_key).await, "secret");
    assert_eq!(body_string(without_key).await, "anonymous");
}

#[tokio::test]
async fn test_supplier_matcher_route_hook() {
    let matcher = SupplierMatcher::string(
        |request: &Request, _: &Response| {
            request
                .routing_info()
                .peek_next_path_component()
                .map(str::to_owned)
        },
        "v1",
    )
    .with_route_hook(|info: &mut RoutingInfo| {
        info.pop_next_path_component();
        info.set_parameter("version", "1");
    });
    let mut root = Router::new();
    root.attach_router(Router::with_matcher(matcher))
        .attach_router(Router::path("status"))
        .attach_handler(handler_fn(|request, response| {
            let version = request
                .routing_info()
                .get_parameter("version")
                .unwrap_or_default()
                .to_string();
            Box::pin(async move { response.set_text(version) })
        }));
    let dispatcher = Dispatcher::new(root);

    let response = dispatch_collect(&dispatcher, get("/v1/status")).await;

    assert_eq!(body_string(response).await, "1");
}

// ============================================================================
// Root Router
// ============================================================================

#[tokio::test]
async fn test_root_is_entered_even_without_match() {
    let log = Log::default();
    let mut root = Router::path("never");
    root.attach_middleware_at_beginning(recorder(&log, "root"));
    root.attach_handler(handler_recording(&log, "handler"));
    let dispatcher = Dispatcher::new(root);

    let response = dispatch_collect(&dispatcher, get("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(entries(&log), ["root", "handler"]);
}

#[tokio::test]
async fn test_route_without_dispatcher_uses_default_policies() {
    let router = Router::new();
    let mut request = get("/nothing/here");
    let mut response = Response::detached();

    let err = router
        .route(&mut request, &mut response)
        .await
        .unwrap_err()
        .into_client_error();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}
