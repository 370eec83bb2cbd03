//! Capture Example
//!
//! A small routing tree with a captured path parameter and a catch-all.
//!
//! Run with:
//! ```bash
//! cargo run --example capture
//! ```
//!
//! Then test:
//! ```bash
//! curl http://localhost:3001/capture/42      # {"count":"42"}
//! curl http://localhost:3001/capture/hello   # Nope! Didn't match.
//! curl http://localhost:3001/                # GET: http://localhost:3001/
//! curl http://localhost:3001/nothing/here    # 404 RESOURCE_NOT_FOUND
//! curl -H 'accept: text/html' http://localhost:3001/nothing/here
//! ```

use axum_dispatch::{
    Config, DispatchServer, MiddlewareExecutor, Result, Router, StringPattern, handler_fn,
    middleware_fn,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config: Config = r#"
[http]
bind_addr = "127.0.0.1"
bind_port = 3001
request_timeout = "10s"

[logging]
format = "default"
"#
    .parse()?;
    config.setup_tracing();

    let mut root = Router::new();

    let capture = root.attach_router(Router::path("capture"));
    capture
        .attach_router(Router::path(
            StringPattern::regex(r"^\d{1,3}$")?.capturing("count"),
        ))
        .attach_handler(handler_fn(|request, response| {
            let routing = request.routing_info();
            tracing::info!(
                has_count = routing.has_parameter("count"),
                count = ?routing.get_parameter("count"),
                "Captured"
            );
            let count = routing.get_parameter("count").unwrap_or_default().to_string();
            Box::pin(async move { response.set_json(&serde_json::json!({ "count": count })) })
        }));
    capture
        .attach_router(Router::path(StringPattern::regex(".+")?))
        .attach_handler(handler_fn(|_, response| {
            Box::pin(async move { response.set_text("Nope! Didn't match.") })
        }));

    root.attach_handler(handler_fn(|request, response| {
        let line = format!("{}: {}", request.method(), request.url());
        tracing::info!("{line}");
        Box::pin(async move { response.set_text(line) })
    }));

    // Every response leaves through here unless something sent it earlier.
    root.attach_middleware_at_end(middleware_fn(|request, response| {
        Box::pin(async move {
            if !response.is_sent() {
                tracing::debug!(url = %request.url(), "Sending from the last middleware");
                response.send()?;
            }
            Ok(())
        })
    }));

    DispatchServer::new(config, root)?
        .setup_middleware()
        .start()
        .await
}
