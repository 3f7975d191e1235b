//! Raw inbound request data.

use crate::error::InboundError;
use covenant_contract::Slot;
use http::header::{CONTENT_TYPE, COOKIE};
use http::Request;
use std::collections::HashMap;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The wire strings of one inbound call, grouped by slot.
///
/// Routing is not done here: path values are supplied by whatever matched
/// the request, already percent-decoded.
///
/// # Example
///
/// ```
/// use covenant_contract::Slot;
/// use covenant_server::InboundRequest;
///
/// let inbound = InboundRequest::new()
///     .with_path("id", "42")
///     .with_query("verbose", "true")
///     .with_cookie("session", "abc");
///
/// assert_eq!(inbound.value(Slot::Path, "id"), Some("42"));
/// assert_eq!(inbound.value(Slot::Cookie, "session"), Some("abc"));
/// assert_eq!(inbound.value(Slot::Header, "x-request-id"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    path: HashMap<String, String>,
    query: Vec<(String, String)>,
    body: Vec<(String, String)>,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
}

impl InboundRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads query, form body, headers and cookies from an HTTP request.
    ///
    /// The body is read as a form only when the content type says so.
    /// Header names are matched case-insensitively; a header whose value is
    /// not UTF-8 is skipped.
    ///
    /// # Errors
    ///
    /// Fails on a malformed query string or form body, or a `Cookie` header
    /// that is not UTF-8.
    pub fn from_http<B, I>(request: &Request<B>, path: I) -> Result<Self, InboundError>
    where
        B: AsRef<[u8]>,
        I: IntoIterator<Item = (String, String)>,
    {
        let query = match request.uri().query() {
            Some(query) => serde_urlencoded::from_str(query).map_err(InboundError::InvalidQuery)?,
            None => Vec::new(),
        };

        let is_form = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with(FORM_CONTENT_TYPE));
        let body = if is_form {
            serde_urlencoded::from_bytes(request.body().as_ref())
                .map_err(InboundError::InvalidForm)?
        } else {
            Vec::new()
        };

        let mut headers = HashMap::new();
        for (name, value) in request.headers() {
            if name == COOKIE {
                continue;
            }
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_string())
                    .or_insert_with(|| value.to_string());
            }
        }

        let mut cookies = HashMap::new();
        for value in request.headers().get_all(COOKIE) {
            let value = value.to_str().map_err(|_| InboundError::InvalidCookieHeader)?;
            cookies.extend(parse_cookies(value));
        }

        Ok(Self {
            path: path.into_iter().collect(),
            query,
            body,
            headers,
            cookies,
        })
    }

    /// Adds a path value.
    #[must_use]
    pub fn with_path(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }

    /// Adds a query pair.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Adds a form body field.
    #[must_use]
    pub fn with_body_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.push((name.into(), value.into()));
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Adds a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// The raw value of a parameter; the first one wins for repeated
    /// query or body names.
    #[must_use]
    pub fn value(&self, slot: Slot, name: &str) -> Option<&str> {
        match slot {
            Slot::Path => self.path.get(name).map(String::as_str),
            Slot::Query => first(&self.query, name),
            Slot::Body => first(&self.body, name),
            Slot::Header => self
                .headers
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
            Slot::Cookie => self.cookies.get(name).map(String::as_str),
        }
    }
}

fn first<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn parse_cookies(header: &str) -> impl Iterator<Item = (String, String)> + '_ {
    header.split(';').filter_map(|cookie| {
        let (name, value) = cookie.trim().split_once('=')?;
        let value = value.trim().trim_matches('"');
        let value = urlencoding::decode(value)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| value.to_string());
        Some((name.trim().to_string(), value))
    })
}
