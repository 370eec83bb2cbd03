use {
    axum::{
        Json,
        response::{IntoResponse, Response},
    },
    http::StatusCode,
    serde_json::{Map, Value},
    std::{error::Error as StdError, time::Duration},
    thiserror::Error,
};

/// Extra, JSON-serializable details attached to a [`ClientAccessibleError`].
pub type Extras = Map<String, Value>;

/// An error that is safe to show to the client that caused it.
///
/// Carries an HTTP status, a machine-readable title such as
/// `RESOURCE_NOT_FOUND`, a message aimed at the developer integrating with the
/// API, a message aimed at the end user, and optional structured extras.
///
/// The optional cause is kept for operator-side diagnostics only. It is
/// never part of the rendered response.
#[derive(Debug, Error)]
#[error("{title} ({status}): {message}")]
pub struct ClientAccessibleError {
    status: StatusCode,
    title: String,
    message: String,
    developer_message: String,
    user_message: String,
    extras: Extras,
    #[source]
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ClientAccessibleError {
    /// Creates a new client-accessible error.
    pub fn new(
        status: StatusCode,
        title: impl Into<String>,
        developer_message: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        let developer_message = developer_message.into();
        Self {
            status,
            title: title.into(),
            message: developer_message.clone(),
            developer_message,
            user_message: user_message.into(),
            extras: Extras::new(),
            cause: None,
        }
    }

    /// Signals that a `type_name` identified by `identifier` does not exist.
    ///
    /// The title is derived from the type name, e.g. `user` becomes
    /// `USER_NOT_FOUND`.
    pub fn not_found(type_name: &str, identifier: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{}_NOT_FOUND", type_name.to_uppercase()),
            format!("The given {type_name} ({identifier}) does not exist."),
            format!("The {type_name} ({identifier}) does not exist!"),
        )
    }

    /// Signals that nothing is routed at `path`.
    pub fn resource_not_found(path: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "RESOURCE_NOT_FOUND",
            format!("The specified resource (located at: '{path}') could not be found."),
            "Resource not found!",
        )
    }

    /// Signals that `path` exists but has no handler for `method`.
    pub fn method_not_allowed(method: &http::Method, path: &str) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "METHOD_NOT_ALLOWED",
            format!("The resource located at '{path}' does not support the {method} method."),
            "This action is not allowed on this resource!",
        )
    }

    /// Signals that the request did not complete within `deadline`.
    pub fn request_timeout(deadline: Duration) -> Self {
        Self::new(
            StatusCode::REQUEST_TIMEOUT,
            "REQUEST_TIMEOUT",
            format!(
                "The request did not complete within {}ms.",
                deadline.as_millis()
            ),
            "The server took too long to respond.",
        )
    }

    /// Wraps a failure that is not the client's fault.
    ///
    /// `message` and `cause` are only ever logged. The client sees a generic
    /// internal server error.
    pub fn internal<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let mut error = Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An error occurred on the server that was not at the fault of the client.",
            "An internal error occurred on the server.",
        );
        error.message = message.into();
        error.cause = Some(cause.into());
        error
    }

    /// Adds one extra field to the rendered error.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Replaces all extras.
    #[must_use]
    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The operator-facing message. Equal to the developer message unless
    /// this error wraps an internal failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn developer_message(&self) -> &str {
        &self.developer_message
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn extras(&self) -> &Extras {
        &self.extras
    }

    /// The wrapped cause, if any. Never rendered.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Builds the JSON document sent to clients.
    ///
    /// Extras are merged into the `error` object after the three standard
    /// fields and win on key collisions.
    pub fn to_json(&self) -> Value {
        let mut error = Map::new();
        error.insert("title".into(), Value::from(self.title.as_str()));
        error.insert(
            "developerMessage".into(),
            Value::from(self.developer_message.as_str()),
        );
        error.insert(
            "userMessage".into(),
            Value::from(self.user_message.as_str()),
        );
        error.extend(self.extras.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut document = Map::new();
        document.insert("error".into(), Value::Object(error));
        Value::Object(document)
    }
}

impl IntoResponse for ClientAccessibleError {
    fn into_response(self) -> Response {
        let status = self.status;
        tracing::warn!(
            title = %self.title,
            status = %status.as_u16(),
            message = %self.message,
            "Rendering client-accessible error"
        );
        (status, Json(self.to_json())).into_response()
    }
}
