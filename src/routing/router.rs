use {
    super::{Handler, MatchResult, Matcher, StringPattern, SupplierMatcher},
    crate::{
        Error, Request, Response, Result,
        middleware::{Middleware, MiddlewareExecutor, MiddlewareManager},
    },
    futures_util::future::BoxFuture,
    std::{fmt, sync::Arc},
};

/// A node of the routing tree.
///
/// A router optionally has a [`Matcher`] deciding whether it applies to a
/// request, an ordered list of children, an optional terminal [`Handler`]
/// and its own middleware. Entering a router:
///
/// 1. records the matcher's capture and runs its route hook,
/// 2. runs the pre-handler middleware,
/// 3. enters the first child that matches, if any,
/// 4. otherwise runs the handler when the request is fulfilled, or the
///    unhandled-request policy,
/// 5. runs the post-handler middleware.
///
/// Steps 3 and 4 are skipped when the pre-handler middleware sent the
/// response. Errors are never caught here.
///
/// ```rust
/// use axum_dispatch::{Router, StringPattern, handler_fn};
///
/// let mut root = Router::new();
/// root.attach_routers([
///     Router::path("capture"),
///     Router::path(StringPattern::regex(r"^\d{1,3}$").unwrap().capturing("count")),
/// ])
/// .attach_handler(handler_fn(|request, response| {
///     Box::pin(async move {
///         let count = request.routing_info().get_parameter("count").unwrap_or_default();
///         response.set_text(format!("count = {count}"))?;
///         Ok(())
///     })
/// }));
/// ```
#[derive(Default)]
pub struct Router {
    matcher: Option<Box<dyn Matcher>>,
    children: Vec<Router>,
    handler: Option<Arc<dyn Handler>>,
    middleware: MiddlewareManager,
}

impl Router {
    /// A router that applies to every request.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matcher(matcher: impl Matcher + 'static) -> Self {
        Self {
            matcher: Some(Box::new(matcher)),
            ..Self::default()
        }
    }

    /// Matches and consumes the next path segment.
    pub fn path(pattern: impl Into<StringPattern>) -> Self {
        Self::with_matcher(SupplierMatcher::path_segment(pattern))
    }

    /// Matches and consumes the next subdomain.
    pub fn subdomain(pattern: impl Into<StringPattern>) -> Self {
        Self::with_matcher(SupplierMatcher::subdomain(pattern))
    }

    /// Matches the request method.
    pub fn method(pattern: impl Into<StringPattern>) -> Self {
        Self::with_matcher(SupplierMatcher::method(pattern))
    }

    /// Matches the full domain name (`example.com`).
    pub fn domain(pattern: impl Into<StringPattern>) -> Self {
        Self::with_matcher(SupplierMatcher::domain(pattern))
    }

    pub fn should_route(&self, request: &Request, response: &Response) -> bool {
        self.evaluate(request, response).matched
    }

    /// Routes a request into this router.
    ///
    /// The router is entered whether or not its own matcher applies; a
    /// capture is recorded only on a match.
    pub fn route<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, Result<()>> {
        let captured = self.evaluate(request, response).captured;
        self.enter(request, response, captured)
    }

    /// Invokes the handler directly, bypassing matching and middleware.
    ///
    /// Fails with [`ErrorKind::Configuration`](crate::ErrorKind::Configuration)
    /// when no handler is attached.
    pub async fn handle(&self, request: &mut Request, response: &mut Response) -> Result<()> {
        match &self.handler {
            Some(handler) => handler.handle(request, response).await,
            None => Err(Error::config(format!(
                "no handler is attached to the router for {}",
                request.url().path()
            ))),
        }
    }

    /// Appends a child and returns it.
    pub fn attach_router(&mut self, router: Router) -> &mut Router {
        let index = self.children.len();
        self.children.push(router);
        &mut self.children[index]
    }

    /// Attaches each router as the child of the previous one and returns the
    /// last. Returns `self` when `routers` is empty.
    pub fn attach_routers(&mut self, routers: impl IntoIterator<Item = Router>) -> &mut Router {
        routers
            .into_iter()
            .fold(self, |parent, child| parent.attach_router(child))
    }

    /// Sets the terminal handler, replacing any previous one.
    pub fn attach_handler(&mut self, handler: impl Handler + 'static) -> &mut Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Removes and returns the terminal handler.
    pub fn detach_handler(&mut self) -> Option<Arc<dyn Handler>> {
        self.handler.take()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn children(&self) -> &[Router] {
        &self.children
    }

    pub fn middleware(&self) -> &MiddlewareManager {
        &self.middleware
    }

    fn evaluate(&self, request: &Request, response: &Response) -> MatchResult {
        match &self.matcher {
            Some(matcher) => matcher.evaluate(request, response),
            None => MatchResult {
                matched: true,
                captured: None,
            },
        }
    }

    fn enter<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
        captured: Option<String>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(matcher) = &self.matcher {
                if let (Some(name), Some(value)) = (matcher.parameter(), captured) {
                    request.routing_info_mut().set_parameter(name, value);
                }
                matcher.on_route(request.routing_info_mut());
            }

            self.middleware
                .execute_pre_handler_middleware(request, response)
                .await?;

            if !response.is_sent() {
                let mut delegated = false;
                for child in &self.children {
                    let result = child.evaluate(request, response);
                    if result.matched {
                        child.enter(request, response, result.captured).await?;
                        delegated = true;
                        break;
                    }
                }
                if !delegated {
                    self.conclude(request, response).await?;
                }
            }

            self.middleware
                .execute_post_handler_middleware(request, response)
                .await
        })
    }

    async fn conclude(&self, request: &mut Request, response: &mut Response) -> Result<()> {
        let policies = request.shared_policies();
        match &self.handler {
            Some(handler) if policies.is_fulfilled(request, response) => {
                tracing::debug!(url = %request.url(), "Invoking handler");
                handler.handle(request, response).await
            }
            _ => {
                tracing::debug!(url = %request.url(), "Request not handled by any router");
                policies
                    .unhandled_request_handler()
                    .handle(request, response)
                    .await
            }
        }
    }
}

impl MiddlewareExecutor for Router {
    fn attach_middleware_at_beginning(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.middleware.attach_middleware_at_beginning(middleware);
        self
    }

    fn attach_middleware_before_handler(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.middleware.attach_middleware_before_handler(middleware);
        self
    }

    fn attach_middleware_after_handler(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.middleware.attach_middleware_after_handler(middleware);
        self
    }

    fn attach_middleware_at_end(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.middleware.attach_middleware_at_end(middleware);
        self
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("matcher", &self.matcher.is_some())
            .field("children", &self.children)
            .field("handler", &self.handler.is_some())
            .field("middleware", &self.middleware)
            .finish()
    }
}
