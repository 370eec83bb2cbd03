//! Panic recovery.

use super::DispatchServer;
use crate::{ClientAccessibleError, HttpMiddleware};

use {axum::response::IntoResponse, std::any::Any, tower_http::catch_panic::CatchPanicLayer};

impl DispatchServer {
    /// Turns a panic anywhere below this layer into a generic 500 response.
    ///
    /// The panic message is logged and forwarded to the panic notification
    /// channel, never to the client.
    #[must_use]
    pub fn setup_catch_panic(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::CatchPanic) {
            return self;
        }

        let panic_channel = self.panic_channel.clone();
        self.inner = self.inner.layer(CatchPanicLayer::custom(
            move |err: Box<dyn Any + Send + 'static>| {
                let msg = panic_message(err.as_ref());

                tracing::error!("Service panicked: {}", msg);
                if let Some(ch) = &panic_channel {
                    ch.try_send(msg.clone()).ok();
                }

                ClientAccessibleError::internal("the service panicked", msg).into_response()
            },
        ));
        self
    }
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "panic payload is not a string".to_string()
    }
}
