//! Query parameters for table requests.
//!
//! # Design
//! `Params` is an ordered multi-valued list of name/value pairs rather than a
//! map, so repeated parameters and insertion order survive into the rendered
//! query string. `sysparm_fields` is reserved: the client overrides it on
//! every call that carries a field selector, so callers setting it directly
//! will have their value replaced.

use std::fmt;

/// Reserved parameter restricting which fields the server returns or accepts.
/// Always set by the client; callers should not set it themselves.
pub const SYSPARM_FIELDS: &str = "sysparm_fields";

/// Server-side query-language parameter (encoded query terms).
pub const SYSPARM_QUERY: &str = "sysparm_query";

/// An ordered, multi-valued collection of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value for `name`, keeping any existing values.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Replace all values for `name` with a single value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.pairs.retain(|(n, _)| n != name);
        self.pairs.push((name.to_string(), value.into()));
        self
    }

    /// All values recorded for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Render as a percent-encoded query string, without a leading `?`.
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.pairs {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query_string())
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}
