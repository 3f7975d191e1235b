//! Verb and path patterns.
//!
//! A pattern names one or more verbs, a colon, then a path whose `{name}`
//! segments are placeholders for path parameters:
//!
//! ```text
//! GET | POST : items/{id}/notes
//! ```

use http::Method;
use std::collections::HashMap;
use std::fmt;

/// A segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A literal segment (e.g. `items`).
    Literal(String),
    /// A placeholder (e.g. `{id}`).
    Parameter(String),
}

/// A parsed verb and path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    verbs: Vec<Method>,
    segments: Vec<PathSegment>,
}

impl PathPattern {
    /// Parses a pattern.
    ///
    /// # Errors
    ///
    /// Returns a reason when the colon is missing, no verb is named, a verb
    /// is not a valid HTTP method, or a segment has stray braces.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        let (verbs, path) = pattern
            .split_once(':')
            .ok_or_else(|| "expected ':' between verbs and path".to_string())?;

        let verbs = verbs
            .split('|')
            .map(str::trim)
            .filter(|verb| !verb.is_empty())
            .map(|verb| {
                Method::from_bytes(verb.to_ascii_uppercase().as_bytes())
                    .map_err(|_| format!("'{verb}' is not an HTTP verb"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if verbs.is_empty() {
            return Err("at least one verb is required".to_string());
        }

        let segments = Self::parse_path(path.trim())?;
        Ok(Self { verbs, segments })
    }

    fn parse_path(path: &str) -> Result<Vec<PathSegment>, String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    if name.is_empty() || name.contains(['{', '}']) {
                        return Err(format!("invalid placeholder '{segment}'"));
                    }
                    Ok(PathSegment::Parameter(name.to_string()))
                } else if segment.contains(['{', '}']) {
                    Err(format!("stray brace in segment '{segment}'"))
                } else {
                    Ok(PathSegment::Literal(segment.to_string()))
                }
            })
            .collect()
    }

    /// Declared verbs, first is the default.
    #[must_use]
    pub fn verbs(&self) -> &[Method] {
        &self.verbs
    }

    /// Parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Placeholder names in order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            PathSegment::Parameter(name) => Some(name.as_str()),
            PathSegment::Literal(_) => None,
        })
    }

    /// Number of placeholders.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.placeholders().count()
    }

    /// Renders the path with placeholders replaced, in order, by already
    /// encoded values. Missing values leave the placeholder in place.
    #[must_use]
    pub fn render(&self, values: &[String]) -> String {
        let mut values = values.iter();
        self.segments
            .iter()
            .map(|segment| match segment {
                PathSegment::Literal(literal) => literal.clone(),
                PathSegment::Parameter(name) => values
                    .next()
                    .cloned()
                    .unwrap_or_else(|| format!("{{{name}}}")),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Matches a concrete path and extracts raw placeholder values.
    #[must_use]
    pub fn match_path(&self, request_path: &str) -> Option<HashMap<String, String>> {
        let request_segments: Vec<&str> = request_path.split('/').filter(|s| !s.is_empty()).collect();

        if request_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, actual) in self.segments.iter().zip(request_segments) {
            match pattern {
                PathSegment::Literal(literal) => {
                    if literal != actual {
                        return None;
                    }
                }
                PathSegment::Parameter(name) => {
                    params.insert(name.clone(), actual.to_string());
                }
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verbs: Vec<&str> = self.verbs.iter().map(Method::as_str).collect();
        write!(f, "{} : {}", verbs.join(" | "), self.render(&[]))
    }
}

/// Joins a root path and a relative path, normalizing slashes.
#[must_use]
pub fn join_path(root: &str, path: &str) -> String {
    let root = root.trim_matches('/');
    let path = path.trim_matches('/');
    match (root.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => root.to_string(),
        (false, false) => format!("{root}/{path}"),
    }
}

/// Normalizes a root path: strips a trailing `/*` and surrounding slashes.
#[must_use]
pub fn normalize_root(root: &str) -> String {
    let root = root.trim();
    root.strip_suffix("/*")
        .or_else(|| root.strip_suffix('*'))
        .unwrap_or(root)
        .trim_matches('/')
        .to_string()
}
