use serde::Deserialize;

/// Selects which of the server's tower layers are installed.
///
/// In TOML this is either `include = [...]` or `exclude = [...]` under
/// `[http]`. When neither is given every layer is enabled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HttpMiddlewareConfig {
    Include(Vec<HttpMiddleware>),
    Exclude(Vec<HttpMiddleware>),
}

impl HttpMiddlewareConfig {
    pub fn is_enabled(&self, middleware: HttpMiddleware) -> bool {
        match self {
            HttpMiddlewareConfig::Include(list) => list.contains(&middleware),
            HttpMiddlewareConfig::Exclude(list) => !list.contains(&middleware),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HttpMiddleware {
    /// Sets and propagates the `x-request-id` header.
    RequestId,
    /// Opens a tracing span per request.
    Logging,
    /// Turns panics inside the dispatcher into 500 responses.
    CatchPanic,
}
