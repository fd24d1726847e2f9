//! Path template compilation.
//!
//! `{name}` captures one segment, `{name...}` captures the remainder of the
//! path including `/`. The remainder capture is a plain greedy group, so used
//! mid-template it can swallow literal text that follows it.

use crate::error::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of path captures before the variable storage spills to the heap.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Capture name / value pairs in declaration order.
///
/// Names are `Arc<str>` shared with the compiled pattern, values are owned
/// per request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

#[allow(clippy::expect_used)]
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)(\.\.\.)?\}").expect("placeholder scanner compiles"));

/// Variables extracted from a matched path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVars(ParamVec);

impl PathVars {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy into a `HashMap`. Allocates; prefer [`PathVars::get`] on the request path.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    captures: Vec<Arc<str>>,
}

impl PathPattern {
    /// Compile `template` into an anchored matcher.
    ///
    /// Literal text is escaped, so `/v1.0/{id}` only matches a real dot.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateCapture`] if a capture name repeats,
    /// [`ConfigError::InvalidPattern`] if the resulting regex does not compile.
    pub fn compile(template: &str) -> Result<Self, ConfigError> {
        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');
        let mut captures: Vec<Arc<str>> = Vec::with_capacity(template.matches('{').count());
        let mut literal_start = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            if captures.iter().any(|c| c.as_ref() == name) {
                return Err(ConfigError::DuplicateCapture {
                    name: name.to_string(),
                    template: template.to_string(),
                });
            }

            pattern.push_str(&regex::escape(&template[literal_start..whole.start()]));
            if caps.get(2).is_some() {
                pattern.push_str("(.+)");
            } else {
                pattern.push_str("([^/]+)");
            }
            captures.push(Arc::from(name));
            literal_start = whole.end();
        }

        pattern.push_str(&regex::escape(&template[literal_start..]));
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            captures,
        })
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Source of the compiled regex, e.g. `^/items/([^/]+)$`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Capture names in declaration order.
    #[must_use]
    pub fn capture_names(&self) -> &[Arc<str>] {
        &self.captures
    }

    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match a request path, returning one variable per capture.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<PathVars> {
        let caps = self.regex.captures(path)?;
        let mut vars = ParamVec::new();
        for (i, name) in self.captures.iter().enumerate() {
            let value = caps.get(i + 1).map_or("", |m| m.as_str());
            vars.push((Arc::clone(name), value.to_string()));
        }
        Some(PathVars(vars))
    }

    /// Substitute bindings into the template.
    ///
    /// The first literal `{name}` for each binding is replaced; unknown names
    /// are ignored and placeholders without a binding stay as they are.
    /// Remainder placeholders (`{name...}`) are never substituted.
    pub fn reverse<I, K, V>(&self, bindings: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut path = self.template.clone();
        for (name, value) in bindings {
            let placeholder = format!("{{{}}}", name.as_ref());
            path = path.replacen(&placeholder, value.as_ref(), 1);
        }
        path
    }
}
