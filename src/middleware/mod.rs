//! Middleware: side effects that run around a router's handler.
//!
//! A [`Middleware`] receives the request and the response under
//! construction, and may inspect or mutate both. Each router owns a
//! [`MiddlewareManager`] with two ordered lists, one run before the router
//! looks at its children and one run after.
//!
//! Closures are adapted with [`middleware_fn`]:
//!
//! ```rust
//! use axum_dispatch::{MiddlewareExecutor, Router, middleware_fn};
//!
//! let mut root = Router::new();
//! root.attach_middleware_at_end(middleware_fn(|request, response| {
//!     Box::pin(async move {
//!         tracing::debug!(url = %request.url(), status = %response.status(), "routed");
//!         Ok(())
//!     })
//! }));
//! ```

mod manager;

pub use manager::*;

use {
    crate::{Request, Response, Result},
    futures_util::future::BoxFuture,
};

/// A step executed while a request passes through a router.
pub trait Middleware: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Registration of middleware relative to a handler.
///
/// | method | effect |
/// |---|---|
/// | `attach_middleware_at_beginning` | runs before every other pre-handler middleware |
/// | `attach_middleware_before_handler` | runs after every other pre-handler middleware |
/// | `attach_middleware_after_handler` | runs before every other post-handler middleware |
/// | `attach_middleware_at_end` | runs after every other post-handler middleware |
pub trait MiddlewareExecutor {
    fn attach_middleware_at_beginning(&mut self, middleware: impl Middleware + 'static)
    -> &mut Self;

    fn attach_middleware_before_handler(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self;

    fn attach_middleware_after_handler(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self;

    fn attach_middleware_at_end(&mut self, middleware: impl Middleware + 'static) -> &mut Self;
}

/// Middleware backed by a closure. See [`middleware_fn`].
#[derive(Clone)]
pub struct FnMiddleware<F> {
    f: F,
}

/// Wraps a closure returning a boxed future as [`Middleware`].
pub fn middleware_fn<F>(f: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync
        + 'static,
{
    FnMiddleware { f }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    fn execute<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, Result<()>> {
        (self.f)(request, response)
    }
}

impl<M> Middleware for std::sync::Arc<M>
where
    M: Middleware + ?Sized,
{
    fn execute<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, Result<()>> {
        (**self).execute(request, response)
    }
}
