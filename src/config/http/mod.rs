mod middleware;

pub use middleware::*;

use {
    crate::{Error, Result},
    serde::Deserialize,
    std::time::Duration,
};

///
/// Configuration for the HTTP server
///
/// Controls where the server listens, how long a single dispatch may run and
/// how long graceful shutdown waits for in-flight requests.
///
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// IP address to bind the HTTP server to
    /// The default `bind_addr` is "127.0.0.1".
    #[serde(default = "HttpConfig::default_bind_addr")]
    pub bind_addr: String,

    /// Port to bind the HTTP server to
    /// The default `bind_port` is 3000.
    #[serde(default = "HttpConfig::default_bind_port")]
    pub bind_port: u16,

    /// Maximum time a request may spend in the router tree.
    /// When exceeded the in-flight dispatch is dropped and, unless a response
    /// was already sent, the client receives a 408 Request Timeout.
    /// By default `request_timeout` is 30 seconds.
    #[serde(
        default = "HttpConfig::default_request_timeout",
        with = "humantime_serde"
    )]
    pub request_timeout: Option<Duration>,

    /// Maximum time to wait for graceful shutdown to complete.
    /// After this timeout, the server will force shutdown.
    /// By default `shutdown_timeout` is set to 30 seconds.
    #[serde(
        default = "HttpConfig::default_shutdown_timeout",
        with = "humantime_serde"
    )]
    pub shutdown_timeout: Duration,

    #[serde(flatten)]
    pub middleware: Option<HttpMiddlewareConfig>,
}

impl HttpConfig {
    ///
    /// Returns the full bind address as a string in the format "IP:PORT".
    ///
    pub fn full_bind_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.bind_port)
    }

    /// Returns true unless the middleware was excluded (or not included).
    pub fn is_middleware_enabled(&self, middleware: HttpMiddleware) -> bool {
        self.middleware
            .as_ref()
            .is_none_or(|config| config.is_enabled(middleware))
    }

    fn default_bind_addr() -> String {
        "127.0.0.1".into()
    }

    fn default_bind_port() -> u16 {
        3000
    }

    fn default_request_timeout() -> Option<Duration> {
        Some(Duration::from_secs(30))
    }

    fn default_shutdown_timeout() -> Duration {
        Duration::from_secs(30)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(Error::invalid_input(
                "HTTP bind_addr is required. Set [http] bind_addr = \"0.0.0.0\" or \"127.0.0.1\" in config.",
            ));
        }

        if self.bind_addr.parse::<std::net::IpAddr>().is_err() {
            return Err(Error::invalid_input(
                "HTTP bind_addr must be a valid IP address. Examples: \"127.0.0.1\", \"0.0.0.0\", \"::1\"",
            ));
        }

        if self.request_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(Error::invalid_input(
                "HTTP request_timeout must be > 0. Remove it to use the 30s default.",
            ));
        }

        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            bind_addr: Self::default_bind_addr(),
            bind_port: Self::default_bind_port(),
            request_timeout: Self::default_request_timeout(),
            shutdown_timeout: Self::default_shutdown_timeout(),
            middleware: None,
        }
    }
}
