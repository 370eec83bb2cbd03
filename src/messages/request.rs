use {
    crate::{DispatchPolicies, Error, ErrorKind, Result, routing::RoutingInfo},
    axum::body::{Body, Bytes},
    http::{
        Extensions, HeaderMap, HeaderValue, Method, Version, header, request::Parts,
        uri::Authority,
    },
    std::{
        fmt,
        sync::{Arc, Mutex, PoisonError},
        time::SystemTime,
    },
    url::Url,
};

/// An inbound request as seen by routers, middleware and handlers.
///
/// Method, URL, version, headers and arrival time are fixed at ingestion.
/// [`RoutingInfo`] and the extension bag change while the request travels
/// down the router tree. The body is read lazily and at most once.
pub struct Request {
    method: Method,
    url: Url,
    version: Version,
    headers: HeaderMap,
    received_at: SystemTime,
    routing: RoutingInfo,
    extensions: Extensions,
    // Only ever accessed through `&mut self`; the mutex makes `Request: Sync`.
    body: Mutex<Option<Body>>,
    policies: Arc<DispatchPolicies>,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            routing: RoutingInfo::new(url.clone()),
            url,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            received_at: SystemTime::now(),
            extensions: Extensions::new(),
            body: Mutex::new(Some(Body::empty())),
            policies: Arc::default(),
        }
    }

    /// Converts a transport request.
    ///
    /// Origin-form targets (`/path?query`) are resolved against the `Host`
    /// header, or `localhost` when the header is missing. Extensions set by
    /// tower layers (such as the request id) are carried over.
    pub fn from_http(request: http::Request<Body>) -> Result<Self> {
        let (parts, body) = request.into_parts();
        let url = absolute_url(&parts)?;
        let Parts {
            method,
            version,
            headers,
            extensions,
            ..
        } = parts;

        Ok(Self {
            method,
            routing: RoutingInfo::new(url.clone()),
            url,
            version,
            headers,
            received_at: SystemTime::now(),
            extensions,
            body: Mutex::new(Some(body)),
            policies: Arc::default(),
        })
    }

    #[must_use]
    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Mutex::new(Some(body.into()));
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The value of `name` if present and valid UTF-8.
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn received_at(&self) -> SystemTime {
        self.received_at
    }

    pub fn routing_info(&self) -> &RoutingInfo {
        &self.routing
    }

    pub fn routing_info_mut(&mut self) -> &mut RoutingInfo {
        &mut self.routing
    }

    /// Typed per-request values shared between middleware and handlers.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// The policies of the dispatcher that ingested this request.
    pub fn policies(&self) -> &DispatchPolicies {
        &self.policies
    }

    pub(crate) fn shared_policies(&self) -> Arc<DispatchPolicies> {
        Arc::clone(&self.policies)
    }

    pub(crate) fn set_policies(&mut self, policies: Arc<DispatchPolicies>) {
        self.policies = policies;
    }

    /// Reads the whole body. A second call fails with
    /// [`ErrorKind::BodyConsumed`].
    pub async fn body_bytes(&mut self) -> Result<Bytes> {
        let body = self
            .body
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(Error::body_consumed)?;
        Ok(axum::body::to_bytes(body, usize::MAX).await?)
    }

    /// Reads the whole body as UTF-8 text.
    pub async fn body_text(&mut self) -> Result<String> {
        let bytes = self.body_bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|err| Error::new(ErrorKind::InvalidInput, err))
    }

    /// Returns true once the body has been read.
    pub fn is_body_consumed(&mut self) -> bool {
        self.body
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Resolves the request target to an absolute URL.
///
/// The authority comes from an absolute-form target or the `Host` header and
/// must be a bare `host[:port]`. Anything else (a path, a query, user
/// information) would change what the router tree sees, so it is rejected.
fn absolute_url(parts: &Parts) -> Result<Url> {
    let authority = match parts.uri.authority() {
        Some(authority) => authority.clone(),
        None => match parts.headers.get(header::HOST) {
            Some(value) if !value.is_empty() => value.to_str()?.parse::<Authority>()?,
            _ => Authority::from_static("localhost"),
        },
    };
    if authority.as_str().contains('@') {
        return Err(Error::invalid_input(format!(
            "the authority `{authority}` must not carry user information"
        )));
    }

    let scheme = parts.uri.scheme_str().unwrap_or("http");
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Ok(Url::parse(&format!("{scheme}://{authority}{target}"))?)
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("version", &self.version)
            .field("headers", &self.headers)
            .field("routing", &self.routing)
            .finish_non_exhaustive()
    }
}
