use {
    super::RoutingInfo,
    crate::{Request, Response, Result},
    http::Method,
    regex::Regex,
    std::fmt,
};

/// The outcome of evaluating a [`Matcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    /// The value to record under the matcher's parameter name.
    pub captured: Option<String>,
}

impl MatchResult {
    pub fn hit(captured: impl Into<String>) -> Self {
        Self {
            matched: true,
            captured: Some(captured.into()),
        }
    }

    pub fn miss() -> Self {
        Self::default()
    }
}

/// Decides whether a router applies to a request.
pub trait Matcher: Send + Sync {
    fn evaluate(&self, request: &Request, response: &Response) -> MatchResult;

    /// The routing parameter that receives the captured value.
    fn parameter(&self) -> Option<&str> {
        None
    }

    /// Called once the router owning this matcher has been selected.
    fn on_route(&self, _routing: &mut RoutingInfo) {}
}

type Supplier<T> = Box<dyn Fn(&Request, &Response) -> Option<T> + Send + Sync>;
type Predicate<T> = Box<dyn Fn(&T) -> MatchResult + Send + Sync>;
type RouteHook = Box<dyn Fn(&mut RoutingInfo) + Send + Sync>;

/// A [`Matcher`] built from a supplier and a predicate.
///
/// The supplier derives a value from the request (the next path segment,
/// the method, ...). A supplier returning `None` never matches and the
/// predicate is not consulted, so no pattern can match an exhausted path or
/// subdomain cursor. Implement [`Matcher`] directly when a missing value has
/// to be accepted.
pub struct SupplierMatcher<T> {
    supplier: Supplier<T>,
    predicate: Predicate<T>,
    parameter: Option<String>,
    route_hook: Option<RouteHook>,
}

impl<T: 'static> SupplierMatcher<T> {
    pub fn new<S, P>(supplier: S, predicate: P) -> Self
    where
        S: Fn(&Request, &Response) -> Option<T> + Send + Sync + 'static,
        P: Fn(&T) -> MatchResult + Send + Sync + 'static,
    {
        Self {
            supplier: Box::new(supplier),
            predicate: Box::new(predicate),
            parameter: None,
            route_hook: None,
        }
    }

    /// Records the captured value under `name` when the router is entered.
    #[must_use]
    pub fn capture_as(mut self, name: impl Into<String>) -> Self {
        self.parameter = Some(name.into());
        self
    }

    /// Runs `hook` when the router is entered, after the capture is recorded.
    #[must_use]
    pub fn with_route_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(&mut RoutingInfo) + Send + Sync + 'static,
    {
        self.route_hook = Some(Box::new(hook));
        self
    }
}

impl SupplierMatcher<String> {
    /// Matches `pattern` against a string derived from the request.
    ///
    /// A capture name set on the pattern carries over to the matcher.
    pub fn string<S>(supplier: S, pattern: impl Into<StringPattern>) -> Self
    where
        S: Fn(&Request, &Response) -> Option<String> + Send + Sync + 'static,
    {
        let mut pattern = pattern.into();
        let parameter = pattern.parameter.take();
        let mut matcher = Self::new(supplier, move |value: &String| pattern.test(value));
        matcher.parameter = parameter;
        matcher
    }

    /// Matches the next unconsumed path segment and consumes it on entry.
    pub fn path_segment(pattern: impl Into<StringPattern>) -> Self {
        Self::string(
            |request, _| {
                request
                    .routing_info()
                    .peek_next_path_component()
                    .map(str::to_owned)
            },
            pattern,
        )
        .with_route_hook(|routing| {
            routing.pop_next_path_component();
        })
    }

    /// Matches the next unconsumed subdomain and consumes it on entry.
    pub fn subdomain(pattern: impl Into<StringPattern>) -> Self {
        Self::string(
            |request, _| {
                request
                    .routing_info()
                    .peek_next_subdomain()
                    .map(str::to_owned)
            },
            pattern,
        )
        .with_route_hook(|routing| {
            routing.pop_next_subdomain();
        })
    }

    /// Matches the request method name, e.g. `GET`.
    pub fn method(pattern: impl Into<StringPattern>) -> Self {
        Self::string(|request, _| Some(request.method().as_str().to_owned()), pattern)
    }

    /// Matches the full domain name, e.g. `example.com`.
    pub fn domain(pattern: impl Into<StringPattern>) -> Self {
        Self::string(
            |request, _| Some(request.routing_info().full_domain_name()),
            pattern,
        )
    }
}

impl<T: 'static> Matcher for SupplierMatcher<T> {
    fn evaluate(&self, request: &Request, response: &Response) -> MatchResult {
        match (self.supplier)(request, response) {
            Some(value) => (self.predicate)(&value),
            None => MatchResult::miss(),
        }
    }

    fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    fn on_route(&self, routing: &mut RoutingInfo) {
        if let Some(hook) = &self.route_hook {
            hook(routing);
        }
    }
}

impl<T> fmt::Debug for SupplierMatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplierMatcher")
            .field("parameter", &self.parameter)
            .field("route_hook", &self.route_hook.is_some())
            .finish_non_exhaustive()
    }
}

enum PatternKind {
    Exact { value: String, ignore_case: bool },
    Regex(Regex),
    Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

/// A test applied to a string: exact equality, a regular expression or an
/// arbitrary predicate.
///
/// A matching candidate is captured whole.
///
/// ```rust
/// use axum_dispatch::StringPattern;
///
/// let count = StringPattern::regex(r"^\d{1,3}$").unwrap().capturing("count");
/// assert!(count.test("42").matched);
/// assert!(!count.test("4242").matched);
///
/// let get = StringPattern::exact_ignore_case("get");
/// assert_eq!(get.test("GET").captured.as_deref(), Some("GET"));
/// ```
pub struct StringPattern {
    kind: PatternKind,
    parameter: Option<String>,
}

impl StringPattern {
    pub fn exact(value: impl Into<String>) -> Self {
        Self::from_kind(PatternKind::Exact {
            value: value.into(),
            ignore_case: false,
        })
    }

    pub fn exact_ignore_case(value: impl Into<String>) -> Self {
        Self::from_kind(PatternKind::Exact {
            value: value.into().to_lowercase(),
            ignore_case: true,
        })
    }

    /// Compiles `pattern`. Invalid expressions are configuration errors.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::from_kind(PatternKind::Regex(Regex::new(pattern)?)))
    }

    /// Matches when `predicate` accepts the supplied text.
    ///
    /// The predicate only ever sees a present value; see [`SupplierMatcher`].
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::from_kind(PatternKind::Predicate(Box::new(predicate)))
    }

    /// Names the routing parameter the matched value is stored under.
    #[must_use]
    pub fn capturing(mut self, name: impl Into<String>) -> Self {
        self.parameter = Some(name.into());
        self
    }

    pub fn test(&self, candidate: &str) -> MatchResult {
        let matched = match &self.kind {
            PatternKind::Exact {
                value,
                ignore_case: false,
            } => candidate == value,
            PatternKind::Exact {
                value,
                ignore_case: true,
            } => candidate.to_lowercase() == *value,
            PatternKind::Regex(regex) => regex.is_match(candidate),
            PatternKind::Predicate(predicate) => predicate(candidate),
        };
        if matched {
            MatchResult::hit(candidate)
        } else {
            MatchResult::miss()
        }
    }

    fn from_kind(kind: PatternKind) -> Self {
        Self {
            kind,
            parameter: None,
        }
    }
}

impl From<&str> for StringPattern {
    fn from(value: &str) -> Self {
        Self::exact(value)
    }
}

impl From<String> for StringPattern {
    fn from(value: String) -> Self {
        Self::exact(value)
    }
}

impl From<Regex> for StringPattern {
    fn from(regex: Regex) -> Self {
        Self::from_kind(PatternKind::Regex(regex))
    }
}

impl From<Method> for StringPattern {
    fn from(method: Method) -> Self {
        Self::exact(method.as_str())
    }
}

impl fmt::Debug for StringPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("StringPattern");
        match &self.kind {
            PatternKind::Exact { value, ignore_case } => debug
                .field("exact", value)
                .field("ignore_case", ignore_case),
            PatternKind::Regex(regex) => debug.field("regex", &regex.as_str()),
            PatternKind::Predicate(_) => debug.field("predicate", &"<fn>"),
        };
        debug.field("parameter", &self.parameter).finish()
    }
}
