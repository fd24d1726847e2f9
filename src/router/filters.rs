//! Request predicates.
//!
//! Every filter answers one yes/no question about a request. Only
//! [`PathMatch`] writes to the [`Context`]: on success it stores the path
//! variables.

use super::pattern::PathPattern;
use crate::error::ConfigError;
use crate::server::Context;
use http::Method;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// A predicate over a request.
///
/// The `Display` output describes the filter and must depend only on how it
/// was constructed.
pub trait StageAcceptor: fmt::Display + Send + Sync {
    fn accept(&self, cx: &mut Context) -> bool;
}

fn compile_regex(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Matches the request path against a compiled template.
#[derive(Debug, Clone)]
pub struct PathMatch {
    pattern: PathPattern,
}

impl PathMatch {
    /// # Errors
    ///
    /// See [`PathPattern::compile`].
    pub fn new(template: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: PathPattern::compile(template)?,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

impl StageAcceptor for PathMatch {
    fn accept(&self, cx: &mut Context) -> bool {
        match self.pattern.match_path(cx.request().path()) {
            Some(vars) => {
                cx.set_path_vars(vars);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for PathMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({:?})", self.pattern.as_str())
    }
}

/// Accepts requests whose method is in a fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMatch(Vec<Method>);

impl MethodMatch {
    pub fn new<I>(methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        Self(methods.into_iter().collect())
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.0
    }
}

impl StageAcceptor for MethodMatch {
    fn accept(&self, cx: &mut Context) -> bool {
        self.0.contains(cx.request().method())
    }
}

impl fmt::Display for MethodMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Method::as_str).collect();
        write!(f, "Methods([{}])", names.join(" "))
    }
}

/// Accepts requests whose header value matches a regex.
///
/// Only the first value of the header is tested. A missing header is tested
/// as the empty string.
#[derive(Debug, Clone)]
pub struct HeaderMatch {
    name: String,
    pattern: Regex,
}

impl HeaderMatch {
    /// # Errors
    ///
    /// [`ConfigError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn new(name: &str, pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.to_string(),
            pattern: compile_regex(pattern)?,
        })
    }
}

impl StageAcceptor for HeaderMatch {
    fn accept(&self, cx: &mut Context) -> bool {
        let value = cx.request().header(&self.name).unwrap_or("");
        self.pattern.is_match(value)
    }
}

impl fmt::Display for HeaderMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Header({:?}, {:?})", self.name, self.pattern.as_str())
    }
}

/// Accepts requests where any value of a query parameter matches a regex.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    name: String,
    pattern: Regex,
}

impl QueryMatch {
    /// # Errors
    ///
    /// [`ConfigError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn new(name: &str, pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.to_string(),
            pattern: compile_regex(pattern)?,
        })
    }
}

impl StageAcceptor for QueryMatch {
    fn accept(&self, cx: &mut Context) -> bool {
        cx.request()
            .query()
            .values(&self.name)
            .any(|value| self.pattern.is_match(value))
    }
}

impl fmt::Display for QueryMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query({:?}, {:?})", self.name, self.pattern.as_str())
    }
}

/// One entry of a route's filter chain.
#[derive(Clone)]
pub enum Filter {
    Path(Arc<PathMatch>),
    Methods(MethodMatch),
    Header(HeaderMatch),
    Query(QueryMatch),
    /// A user-supplied predicate, e.g. an authorization check.
    Custom(Arc<dyn StageAcceptor>),
}

impl Filter {
    pub fn custom<S: StageAcceptor + 'static>(acceptor: S) -> Self {
        Filter::Custom(Arc::new(acceptor))
    }
}

impl StageAcceptor for Filter {
    fn accept(&self, cx: &mut Context) -> bool {
        match self {
            Filter::Path(m) => m.accept(cx),
            Filter::Methods(m) => m.accept(cx),
            Filter::Header(m) => m.accept(cx),
            Filter::Query(m) => m.accept(cx),
            Filter::Custom(m) => m.accept(cx),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Path(m) => fmt::Display::fmt(m, f),
            Filter::Methods(m) => fmt::Display::fmt(m, f),
            Filter::Header(m) => fmt::Display::fmt(m, f),
            Filter::Query(m) => fmt::Display::fmt(m, f),
            Filter::Custom(m) => fmt::Display::fmt(m, f),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
