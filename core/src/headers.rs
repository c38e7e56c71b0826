//! Header container.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use crate::http::HttpRequest;

/// A single header name/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

impl HttpHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Header name to value mapping, ordered by name.
///
/// Names are compared exactly; case folding is left to the transport. The
/// last write for a given name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    headers: BTreeMap<String, String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, header: HttpHeader) {
        self.headers.insert(header.name, header.value);
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `other` on top of `self`; entries from `other` win.
    pub fn merge(mut self, other: &HttpHeaders) -> HttpHeaders {
        for (name, value) in &other.headers {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// Embed the headers into the given request, replacing same-named ones.
    pub fn embed(&self, mut request: HttpRequest) -> HttpRequest {
        for (name, value) in &self.headers {
            request.headers.insert(name.clone(), value.clone());
        }
        request
    }
}

impl FromIterator<HttpHeader> for HttpHeaders {
    fn from_iter<I: IntoIterator<Item = HttpHeader>>(iter: I) -> Self {
        let mut headers = HttpHeaders::new();
        for header in iter {
            headers.add(header);
        }
        headers
    }
}

impl IntoIterator for HttpHeaders {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.into_iter()
    }
}

impl fmt::Display for HttpHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("]")
    }
}
