use {
    crate::{ClientAccessibleError, Handler, Request, Response, Result},
    futures_util::future::BoxFuture,
    std::{fmt, sync::Arc},
};

/// Decides whether a request may be handed to a router's handler.
pub type FulfillmentChecker = Arc<dyn Fn(&Request, &Response) -> bool + Send + Sync>;

/// The two policies consulted by routers that cannot delegate a request.
///
/// - the **fulfillment checker** decides whether a router's own handler may
///   run. By default a request is fulfilled once its whole path has been
///   consumed.
/// - the **unhandled-request handler** runs when no handler claims the
///   request. By default it fails with `RESOURCE_NOT_FOUND` (404) while path
///   segments remain and `METHOD_NOT_ALLOWED` (405) otherwise.
#[derive(Clone)]
pub struct DispatchPolicies {
    unhandled: Arc<dyn Handler>,
    fulfillment: FulfillmentChecker,
}

impl DispatchPolicies {
    pub fn new<F>(unhandled: impl Handler + 'static, fulfillment: F) -> Self
    where
        F: Fn(&Request, &Response) -> bool + Send + Sync + 'static,
    {
        Self {
            unhandled: Arc::new(unhandled),
            fulfillment: Arc::new(fulfillment),
        }
    }

    #[must_use]
    pub fn with_unhandled_request_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.unhandled = Arc::new(handler);
        self
    }

    #[must_use]
    pub fn with_request_fulfillment_checker<F>(mut self, checker: F) -> Self
    where
        F: Fn(&Request, &Response) -> bool + Send + Sync + 'static,
    {
        self.fulfillment = Arc::new(checker);
        self
    }

    pub fn unhandled_request_handler(&self) -> &Arc<dyn Handler> {
        &self.unhandled
    }

    pub fn request_fulfillment_checker(&self) -> &FulfillmentChecker {
        &self.fulfillment
    }

    pub fn is_fulfilled(&self, request: &Request, response: &Response) -> bool {
        (self.fulfillment)(request, response)
    }

    pub(crate) fn replace_unhandled(&mut self, handler: Arc<dyn Handler>) -> Arc<dyn Handler> {
        std::mem::replace(&mut self.unhandled, handler)
    }

    pub(crate) fn replace_fulfillment(&mut self, checker: FulfillmentChecker) -> FulfillmentChecker {
        std::mem::replace(&mut self.fulfillment, checker)
    }
}

impl Default for DispatchPolicies {
    fn default() -> Self {
        Self::new(NotFoundOrNotAllowed, path_consumed)
    }
}

impl fmt::Debug for DispatchPolicies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchPolicies").finish_non_exhaustive()
    }
}

/// The default unhandled-request policy.
///
/// Fails with [`ClientAccessibleError::resource_not_found`] while path
/// segments remain, and [`ClientAccessibleError::method_not_allowed`]
/// otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundOrNotAllowed;

impl Handler for NotFoundOrNotAllowed {
    fn handle<'a>(
        &'a self,
        request: &'a mut Request,
        _response: &'a mut Response,
    ) -> BoxFuture<'a, Result<()>> {
        let path = request.url().path();
        let error = if request.routing_info().has_next_path_component() {
            ClientAccessibleError::resource_not_found(path)
        } else {
            ClientAccessibleError::method_not_allowed(request.method(), path)
        };
        Box::pin(async move { Err(error.into()) })
    }
}

/// The default fulfillment checker: true once no path segment is left.
pub fn path_consumed(request: &Request, _response: &Response) -> bool {
    !request.routing_info().has_next_path_component()
}
