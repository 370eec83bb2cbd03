use {
    crate::{Request, Response, Result},
    futures_util::future::BoxFuture,
    std::sync::Arc,
};

/// Terminal request handling attached to a router.
///
/// Also the shape of the dispatcher's unhandled-request policy.
pub trait Handler: Send + Sync {
    fn handle<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Handler backed by a closure. See [`handler_fn`].
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Wraps a closure returning a boxed future as a [`Handler`].
///
/// ```rust
/// use axum_dispatch::{Router, handler_fn};
///
/// let mut root = Router::new();
/// root.attach_handler(handler_fn(|_request, response| {
///     Box::pin(async move {
///         response.set_text("hello")?;
///         response.send()?;
///         Ok(())
///     })
/// }));
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync
        + 'static,
{
    FnHandler { f }
}

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    fn handle<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, Result<()>> {
        (self.f)(request, response)
    }
}

impl<H> Handler for Arc<H>
where
    H: Handler + ?Sized,
{
    fn handle<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, Result<()>> {
        (**self).handle(request, response)
    }
}
