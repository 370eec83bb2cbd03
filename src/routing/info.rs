use {
    std::collections::HashMap,
    url::{Host, Url},
};

/// Per-request decomposition of the target URL.
///
/// The hostname is split on `.`: the rightmost label is the top-level domain,
/// the label before it the domain name, and whatever is left forms the
/// subdomain sequence ordered from the domain outwards (`api.eu.example.com`
/// yields `["eu", "api"]`). IP-literal hosts have no top-level domain and no
/// subdomains.
///
/// The path is split on `/`. A leading and a trailing empty segment are
/// dropped, interior empty segments are kept. Segments are kept exactly as
/// they appear in the URL, percent-encoding included.
///
/// Both sequences have a cursor that routers advance as they consume
/// segments. Cursors only move forward and popping past the end yields
/// `None`.
#[derive(Debug, Clone)]
pub struct RoutingInfo {
    url: Url,
    top_level_domain: String,
    domain_name: String,
    subdomains: Vec<String>,
    subdomain_cursor: usize,
    path_components: Vec<String>,
    path_cursor: usize,
    trailing_slash: bool,
    parameters: HashMap<String, String>,
}

impl RoutingInfo {
    pub fn new(url: Url) -> Self {
        let (top_level_domain, domain_name, subdomains) = split_host(url.host());
        let (path_components, trailing_slash) = split_path(url.path());

        Self {
            url,
            top_level_domain,
            domain_name,
            subdomains,
            subdomain_cursor: 0,
            path_components,
            path_cursor: 0,
            trailing_slash,
            parameters: HashMap::new(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn top_level_domain(&self) -> &str {
        &self.top_level_domain
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// `domain.tld`, or whichever of the two is present.
    pub fn full_domain_name(&self) -> String {
        match (self.domain_name.is_empty(), self.top_level_domain.is_empty()) {
            (false, false) => format!("{}.{}", self.domain_name, self.top_level_domain),
            (false, true) => self.domain_name.clone(),
            _ => self.top_level_domain.clone(),
        }
    }

    pub fn subdomains(&self) -> &[String] {
        &self.subdomains
    }

    pub fn has_next_subdomain(&self) -> bool {
        self.subdomain_cursor < self.subdomains.len()
    }

    pub fn peek_next_subdomain(&self) -> Option<&str> {
        self.subdomains.get(self.subdomain_cursor).map(String::as_str)
    }

    pub fn pop_next_subdomain(&mut self) -> Option<&str> {
        let index = self.subdomain_cursor;
        if index < self.subdomains.len() {
            self.subdomain_cursor += 1;
        }
        self.subdomains.get(index).map(String::as_str)
    }

    pub fn path_components(&self) -> &[String] {
        &self.path_components
    }

    /// The path segments not consumed yet.
    pub fn remaining_path_components(&self) -> &[String] {
        &self.path_components[self.path_cursor..]
    }

    pub fn has_next_path_component(&self) -> bool {
        self.path_cursor < self.path_components.len()
    }

    pub fn peek_next_path_component(&self) -> Option<&str> {
        self.path_components
            .get(self.path_cursor)
            .map(String::as_str)
    }

    pub fn pop_next_path_component(&mut self) -> Option<&str> {
        let index = self.path_cursor;
        if index < self.path_components.len() {
            self.path_cursor += 1;
        }
        self.path_components.get(index).map(String::as_str)
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Records a captured value. Writing an existing name replaces it.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn get_parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }
}

fn split_host(host: Option<Host<&str>>) -> (String, String, Vec<String>) {
    match host {
        Some(Host::Domain(hostname)) => {
            let mut labels = hostname.split('.').map(str::to_owned).collect::<Vec<_>>();
            let top_level_domain = labels.pop().unwrap_or_default();
            let domain_name = labels.pop().unwrap_or_default();
            labels.reverse();
            (top_level_domain, domain_name, labels)
        }
        Some(Host::Ipv4(ip)) => (String::new(), ip.to_string(), Vec::new()),
        Some(Host::Ipv6(ip)) => (String::new(), ip.to_string(), Vec::new()),
        None => (String::new(), String::new(), Vec::new()),
    }
}

fn split_path(path: &str) -> (Vec<String>, bool) {
    let trailing_slash = path.ends_with('/');
    let mut segments = path.split('/').collect::<Vec<_>>();
    if segments.first().is_some_and(|segment| segment.is_empty()) {
        segments.remove(0);
    }
    if segments.last().is_some_and(|segment| segment.is_empty()) {
        segments.pop();
    }
    (
        segments.into_iter().map(str::to_owned).collect(),
        trailing_slash,
    )
}
