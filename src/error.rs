//! Error types and handling for the dispatch engine.
//!
//! Two families of errors flow through the engine:
//!
//! - [`ClientAccessibleError`]: an expected failure carrying a definite HTTP
//!   status plus separate developer and user messages. It is safe to render
//!   to the client.
//! - everything else: configuration mistakes, I/O failures, a handler's own
//!   error types. These are never shown to the client; the dispatcher turns
//!   them into a generic internal server error and logs the original.
//!
//! # Design
//!
//! This module uses an opaque `Error` struct paired with an `ErrorKind` enum,
//! following the `std::io::Error` pattern. Handlers and middleware return
//! [`crate::Result`], so `?` works on any error that converts into [`Error`].
//!
//! # Example
//!
//! ```rust
//! use axum_dispatch::{ClientAccessibleError, Error, ErrorKind};
//!
//! let error: Error = ClientAccessibleError::not_found("user", "42").into();
//! assert_eq!(error.kind(), ErrorKind::Client);
//!
//! let client = error.into_client_error();
//! assert_eq!(client.status().as_u16(), 404);
//! assert_eq!(client.title(), "USER_NOT_FOUND");
//! ```

mod client;

pub use client::*;

use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
///
/// This enum is marked `#[non_exhaustive]`, so new variants may be added
/// in future versions without breaking existing code. Always include a
/// wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A client-accessible error that should be rendered as-is.
    #[error("client error")]
    Client,

    /// Configuration error (invalid TOML, bad regex, missing handler).
    #[error("configuration error")]
    Configuration,

    /// Invalid input (bad URL, header, request data).
    #[error("invalid input")]
    InvalidInput,

    /// I/O error (file operations, network, body streaming).
    #[error("I/O error")]
    Io,

    /// An attempt to mutate a response after it has been sent.
    #[error("response already sent")]
    ResponseSent,

    /// An attempt to read a request body a second time.
    #[error("request body already consumed")]
    BodyConsumed,

    /// A dispatch did not complete before its deadline.
    #[error("timed out")]
    Timeout,

    /// Internal/unexpected error.
    #[error("internal error")]
    Internal,
}

/// An error that can occur while building or running the dispatcher.
///
/// This is an opaque error type that wraps an underlying error source.
/// Use [`Error::kind()`] to determine the category of error for matching,
/// and the `Display` implementation to get a human-readable message.
///
/// # Creating Errors
///
/// ```rust
/// use axum_dispatch::{Error, ErrorKind};
///
/// let err = Error::internal("unexpected state");
/// let err = Error::invalid_input("missing required field");
///
/// let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
/// let err = Error::new(ErrorKind::Io, io_err);
/// ```
pub struct Error {
    kind: ErrorKind,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl Error {
    /// Creates a new error with the given kind and source.
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            source: error.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns a stable identifier for this error suitable for logs.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ErrorKind::Client => "CLIENT_ERROR",
            ErrorKind::Configuration => "CONFIG_ERROR",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Io => "IO_ERROR",
            ErrorKind::ResponseSent => "RESPONSE_ALREADY_SENT",
            ErrorKind::BodyConsumed => "BODY_ALREADY_CONSUMED",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// Returns true if this error wraps a [`ClientAccessibleError`].
    pub fn is_client_accessible(&self) -> bool {
        self.kind == ErrorKind::Client
    }

    /// Converts this error into something that can be shown to a client.
    ///
    /// A wrapped [`ClientAccessibleError`] is returned unchanged. Any other
    /// error becomes [`ClientAccessibleError::internal`], keeping the original
    /// as its (never serialized) cause.
    pub fn into_client_error(self) -> ClientAccessibleError {
        let kind = self.kind;
        if kind == ErrorKind::Client {
            match self.source.downcast::<ClientAccessibleError>() {
                Ok(client) => return *client,
                Err(source) => return ClientAccessibleError::internal(kind.to_string(), source),
            }
        }
        let message = format!("{}: {}", self.error_code(), self.source);
        ClientAccessibleError::internal(message, self)
    }

    /// Consumes the error and returns the inner error source.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.source
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg.into())
    }

    /// Creates an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, msg.into())
    }

    /// Creates an I/O error from a message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, msg.into())
    }

    /// Creates an error for a mutation attempted after the response was sent.
    pub fn response_sent(what: &str) -> Self {
        Self::new(
            ErrorKind::ResponseSent,
            format!("cannot {what}: the response has already been sent"),
        )
    }

    /// Creates an error for a second read of the request body.
    pub fn body_consumed() -> Self {
        Self::new(
            ErrorKind::BodyConsumed,
            "the request body can only be read once",
        )
    }

    /// Creates a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, msg.into())
    }

    /// Creates an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg.into())
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

// ============================================================================
// From implementations
// ============================================================================

impl From<ClientAccessibleError> for Error {
    fn from(err: ClientAccessibleError) -> Self {
        Self::new(ErrorKind::Client, err)
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::new(ErrorKind::InvalidInput, err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::InvalidInput, err)
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::new(ErrorKind::InvalidInput, err)
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::new(ErrorKind::InvalidInput, err)
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::new(ErrorKind::InvalidInput, err)
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::new(ErrorKind::InvalidInput, err)
    }
}

impl From<axum::Error> for Error {
    fn from(err: axum::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<askama::Error> for Error {
    fn from(err: askama::Error) -> Self {
        Self::new(ErrorKind::Internal, err)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::new(ErrorKind::Timeout, err)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::error::Error as StdError;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(format!("{}", ErrorKind::Client), "client error");
        assert_eq!(format!("{}", ErrorKind::Internal), "internal error");
        assert_eq!(
            format!("{}", ErrorKind::ResponseSent),
            "response already sent"
        );
    }

    #[test]
    fn test_error_new() {
        let err = Error::new(ErrorKind::Internal, "test error");
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(format!("{}", err), "test error");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::config("x").error_code(), "CONFIG_ERROR");
        assert_eq!(Error::invalid_input("x").error_code(), "INVALID_INPUT");
        assert_eq!(Error::io("x").error_code(), "IO_ERROR");
        assert_eq!(Error::internal("x").error_code(), "INTERNAL_ERROR");
        assert_eq!(Error::body_consumed().error_code(), "BODY_ALREADY_CONSUMED");
        assert_eq!(Error::timeout("x").error_code(), "TIMEOUT");
        assert_eq!(
            Error::response_sent("set status").error_code(),
            "RESPONSE_ALREADY_SENT"
        );
    }

    #[test]
    fn test_response_sent_message_names_operation() {
        let err = Error::response_sent("set header");
        assert_eq!(err.kind(), ErrorKind::ResponseSent);
        assert!(err.to_string().contains("cannot set header"));
    }

    #[test]
    fn test_client_error_round_trips_through_error() {
        let err: Error = ClientAccessibleError::resource_not_found("/missing").into();
        assert!(err.is_client_accessible());

        let client = err.into_client_error();
        assert_eq!(client.status(), StatusCode::NOT_FOUND);
        assert_eq!(client.title(), "RESOURCE_NOT_FOUND");
        assert!(client.cause().is_none());
    }

    #[test]
    fn test_other_errors_become_internal_server_errors() {
        let err = Error::config("no handler attached");
        let client = err.into_client_error();

        assert_eq!(client.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(client.title(), "INTERNAL_SERVER_ERROR");
        assert!(!client.user_message().contains("no handler"));
        assert!(!client.developer_message().contains("no handler"));

        let cause = client.cause().expect("cause is retained");
        assert!(cause.to_string().contains("no handler attached"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: Error = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_from_toml_error() {
        let toml_err = "invalid".parse::<toml::Value>().unwrap_err();
        let err: Error = toml_err.into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_regex_error() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: Error = regex_err.into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_from_url_parse_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_from_invalid_header() {
        let header_err = http::header::HeaderValue::from_bytes(b"\x00").unwrap_err();
        let err: Error = header_err.into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_error_debug() {
        let err = Error::internal("test");
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Error"));
        assert!(debug_str.contains("Internal"));
    }

    #[test]
    fn test_error_into_inner() {
        let err = Error::internal("test message");
        let inner = err.into_inner();
        assert_eq!(format!("{}", inner), "test message");
    }

    #[test]
    fn test_error_source_trait() {
        let err = Error::internal("test");
        assert!(StdError::source(&err).is_some());
    }
}
