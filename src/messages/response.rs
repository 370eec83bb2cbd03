use {
    crate::{Error, Result},
    axum::body::{Body, Bytes},
    http::{
        HeaderMap, HeaderName, HeaderValue, StatusCode,
        header::{self, CONTENT_TYPE},
    },
    serde::Serialize,
    serde_json::Value,
    std::{fmt, time::SystemTime},
    tokio::sync::oneshot,
};

/// The body of a [`Response`] before it is encoded for the transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseBody {
    #[default]
    Empty,
    Text(String),
    Json(Value),
    Bytes(Bytes),
}

/// The transport end of a [`Response`].
///
/// `deliver` is called at most once per response.
pub trait ResponseSink: Send + Sync {
    fn deliver(&mut self, response: http::Response<Body>) -> Result<()>;
}

/// Hands the finished response to a waiting [`oneshot::Receiver`].
#[derive(Debug)]
pub struct ChannelSink {
    sender: Option<oneshot::Sender<http::Response<Body>>>,
}

impl ChannelSink {
    pub fn new() -> (Self, oneshot::Receiver<http::Response<Body>>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }
}

impl ResponseSink for ChannelSink {
    fn deliver(&mut self, response: http::Response<Body>) -> Result<()> {
        let sender = self
            .sender
            .take()
            .ok_or_else(|| Error::internal("response sink already used"))?;
        sender
            .send(response)
            .map_err(|_| Error::io("the transport stopped waiting for the response"))
    }
}

/// Drops whatever is delivered.
#[derive(Debug, Default)]
pub struct DiscardSink;

impl ResponseSink for DiscardSink {
    fn deliver(&mut self, _response: http::Response<Body>) -> Result<()> {
        Ok(())
    }
}

/// The response under construction for one request.
///
/// Status, headers and body can be changed until [`Response::send`] is
/// called. After that every mutation fails with
/// [`ErrorKind::ResponseSent`](crate::ErrorKind::ResponseSent) and further
/// sends do nothing.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
    sent_at: Option<SystemTime>,
    sink: Box<dyn ResponseSink>,
}

impl Response {
    pub fn new(sink: impl ResponseSink + 'static) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
            sent_at: None,
            sink: Box::new(sink),
        }
    }

    /// A response whose transport end is a [`ChannelSink`].
    pub fn channel() -> (Self, oneshot::Receiver<http::Response<Body>>) {
        let (sink, receiver) = ChannelSink::new();
        (Self::new(sink), receiver)
    }

    /// A response that goes nowhere when sent.
    pub fn detached() -> Self {
        Self::new(DiscardSink)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) -> Result<()> {
        self.ensure_unsent("set the status")?;
        self.status = status;
        Ok(())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Sets a header, replacing previous values of the same name.
    pub fn set_header<K, V>(&mut self, name: K, value: V) -> Result<()>
    where
        K: TryInto<HeaderName>,
        K::Error: Into<Error>,
        V: TryInto<HeaderValue>,
        V::Error: Into<Error>,
    {
        self.ensure_unsent("set a header")?;
        let name = name.try_into().map_err(Into::into)?;
        let value = value.try_into().map_err(Into::into)?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn remove_header(&mut self, name: impl header::AsHeaderName) -> Result<()> {
        self.ensure_unsent("remove a header")?;
        self.headers.remove(name);
        Ok(())
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn set_body(&mut self, body: ResponseBody) -> Result<()> {
        self.ensure_unsent("set the body")?;
        self.body = body;
        Ok(())
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.set_body(ResponseBody::Text(text.into()))
    }

    pub fn set_json(&mut self, value: &impl Serialize) -> Result<()> {
        self.ensure_unsent("set the body")?;
        self.body = ResponseBody::Json(serde_json::to_value(value)?);
        Ok(())
    }

    pub fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }

    pub fn sent_at(&self) -> Option<SystemTime> {
        self.sent_at
    }

    /// Encodes the response and writes it to the sink.
    ///
    /// Returns `Ok(false)` without writing anything if the response was
    /// already sent. The response counts as sent even when the sink fails.
    pub fn send(&mut self) -> Result<bool> {
        if self.is_sent() {
            return Ok(false);
        }
        self.sent_at = Some(SystemTime::now());

        let (default_type, body) = match std::mem::take(&mut self.body) {
            ResponseBody::Empty => (None, Body::empty()),
            ResponseBody::Text(text) => (Some("text/plain; charset=utf-8"), Body::from(text)),
            ResponseBody::Json(value) => (
                Some("application/json"),
                Body::from(serde_json::to_vec(&value)?),
            ),
            ResponseBody::Bytes(bytes) => (Some("application/octet-stream"), Body::from(bytes)),
        };

        let mut response = http::Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        if let Some(content_type) = default_type
            && !response.headers().contains_key(CONTENT_TYPE)
        {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        tracing::debug!(status = %self.status, "Sending response");
        self.sink.deliver(response)?;
        Ok(true)
    }

    fn ensure_unsent(&self, what: &str) -> Result<()> {
        if self.is_sent() {
            Err(Error::response_sent(what))
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("sent_at", &self.sent_at)
            .finish_non_exhaustive()
    }
}
