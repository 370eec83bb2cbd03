use {
    super::{Middleware, MiddlewareExecutor},
    crate::{Request, Response, Result},
    std::{collections::VecDeque, fmt, sync::Arc},
};

/// The two ordered middleware lists of a router.
///
/// Execution is sequential. Each list stops as soon as the response has been
/// sent, and the first error is returned to the caller as is.
#[derive(Clone, Default)]
pub struct MiddlewareManager {
    pre_handler: VecDeque<Arc<dyn Middleware>>,
    post_handler: VecDeque<Arc<dyn Middleware>>,
}

impl MiddlewareManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn execute_pre_handler_middleware(
        &self,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<()> {
        run(&self.pre_handler, request, response).await
    }

    pub async fn execute_post_handler_middleware(
        &self,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<()> {
        run(&self.post_handler, request, response).await
    }

    pub fn pre_handler_count(&self) -> usize {
        self.pre_handler.len()
    }

    pub fn post_handler_count(&self) -> usize {
        self.post_handler.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pre_handler.is_empty() && self.post_handler.is_empty()
    }
}

async fn run(
    list: &VecDeque<Arc<dyn Middleware>>,
    request: &mut Request,
    response: &mut Response,
) -> Result<()> {
    for middleware in list {
        if response.is_sent() {
            break;
        }
        middleware.execute(request, response).await?;
    }
    Ok(())
}

impl MiddlewareExecutor for MiddlewareManager {
    fn attach_middleware_at_beginning(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.pre_handler.push_front(Arc::new(middleware));
        self
    }

    fn attach_middleware_before_handler(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.pre_handler.push_back(Arc::new(middleware));
        self
    }

    fn attach_middleware_after_handler(
        &mut self,
        middleware: impl Middleware + 'static,
    ) -> &mut Self {
        self.post_handler.push_front(Arc::new(middleware));
        self
    }

    fn attach_middleware_at_end(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.post_handler.push_back(Arc::new(middleware));
        self
    }
}

impl fmt::Debug for MiddlewareManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareManager")
            .field("pre_handler", &self.pre_handler.len())
            .field("post_handler", &self.post_handler.len())
            .finish()
    }
}
