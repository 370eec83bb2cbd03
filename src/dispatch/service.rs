use {
    super::Dispatcher,
    crate::{ClientAccessibleError, Request, Response},
    axum::{body::Body, response::IntoResponse},
    futures_util::future::BoxFuture,
    http::StatusCode,
    std::{
        convert::Infallible,
        sync::Arc,
        task::{Context, Poll},
    },
    tower::Service,
};

/// A `tower::Service` running every request through a [`Dispatcher`].
///
/// If nothing in the tree sends the response, it is sent once routing
/// finishes, as it stands.
///
/// ```rust
/// use axum_dispatch::{DispatchService, Dispatcher, Router};
///
/// let service = DispatchService::new(Dispatcher::new(Router::new()));
/// let app: axum::Router = axum::Router::new().fallback_service(service);
/// ```
#[derive(Clone, Debug)]
pub struct DispatchService {
    dispatcher: Arc<Dispatcher>,
}

impl DispatchService {
    pub fn new(dispatcher: impl Into<Arc<Dispatcher>>) -> Self {
        Self {
            dispatcher: dispatcher.into(),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

impl Service<http::Request<Body>> for DispatchService {
    type Response = http::Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Body>) -> Self::Future {
        let dispatcher = Arc::clone(&self.dispatcher);
        Box::pin(async move { Ok(serve(&dispatcher, request).await) })
    }
}

async fn serve(dispatcher: &Dispatcher, request: http::Request<Body>) -> http::Response<Body> {
    let mut request = match Request::from_http(request) {
        Ok(request) => request,
        Err(err) => {
            return ClientAccessibleError::new(
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                format!("The request target could not be resolved: {err}"),
                "The request was malformed.",
            )
            .into_response();
        }
    };

    let (mut response, delivered) = Response::channel();
    dispatcher.dispatch(&mut request, &mut response).await;

    if !response.is_sent()
        && let Err(err) = response.send()
    {
        tracing::error!(error = %err, url = %request.url(), "Failed to send response");
    }
    drop(response);

    match delivered.await {
        Ok(response) => response,
        Err(_) => ClientAccessibleError::internal(
            "response was never delivered",
            "the response sink was dropped without a response",
        )
        .into_response(),
    }
}
