//! HTTP value types exchanged between the pipeline and the transport.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and classifies `HttpResponse` values
//! without ever touching the network; a `Transport` supplied by the host
//! performs the actual I/O. Everything here is owned so a request can move
//! into a spawned task without lifetime concerns.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::headers::HttpHeaders;

/// HTTP method token.
///
/// The set is open: the associated constants cover the common methods and
/// [`HttpMethod::new`] accepts any other token verbatim. Equality and hashing
/// use the raw string, so `"get"` and `"GET"` are different methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpMethod(Cow<'static, str>);

impl HttpMethod {
    pub const CONNECT: HttpMethod = HttpMethod(Cow::Borrowed("CONNECT"));
    pub const DELETE: HttpMethod = HttpMethod(Cow::Borrowed("DELETE"));
    pub const GET: HttpMethod = HttpMethod(Cow::Borrowed("GET"));
    pub const HEAD: HttpMethod = HttpMethod(Cow::Borrowed("HEAD"));
    pub const OPTIONS: HttpMethod = HttpMethod(Cow::Borrowed("OPTIONS"));
    pub const PATCH: HttpMethod = HttpMethod(Cow::Borrowed("PATCH"));
    pub const POST: HttpMethod = HttpMethod(Cow::Borrowed("POST"));
    pub const PUT: HttpMethod = HttpMethod(Cow::Borrowed("PUT"));
    pub const QUERY: HttpMethod = HttpMethod(Cow::Borrowed("QUERY"));
    pub const TRACE: HttpMethod = HttpMethod(Cow::Borrowed("TRACE"));

    /// A method from an arbitrary token. No casing or validation is applied.
    pub fn new(token: impl Into<String>) -> Self {
        HttpMethod(Cow::Owned(token.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for HttpMethod {
    fn from(token: &'static str) -> Self {
        HttpMethod(Cow::Borrowed(token))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where request parameters are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterEncoding {
    /// Appended to the URL as query items.
    Url,
    /// Serialized as a JSON object body.
    Json,
}

/// An HTTP request described as plain data.
///
/// Built by [`crate::builder::make_request`]. The transport executes it and
/// returns the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HttpHeaders,
    pub body: Option<Bytes>,
    /// Per-request timeout. Enforced by the transport, never by the pipeline.
    pub timeout: Duration,
}

impl HttpRequest {
    /// Render the request as an equivalent `curl` command line.
    ///
    /// Used purely as a debugging aid by the logger.
    pub fn curl_string(&self) -> String {
        let mut result = String::from("curl -k ");
        result.push_str(&format!("-X {} \\\n", self.method));

        for (name, value) in self.headers.iter() {
            result.push_str(&format!("-H \"{name}: {value}\" \\\n"));
        }

        if let Some(body) = self.body.as_deref().filter(|b| !b.is_empty()) {
            if let Ok(text) = std::str::from_utf8(body) {
                result.push_str(&format!("-d '{text}' \\\n"));
            }
        }

        result.push_str(self.url.as_str());
        result
    }
}

/// The transport's answer to an `HttpRequest`, consumed once by the pipeline.
///
/// `status` is `None` when the transport produced no HTTP-level response.
/// It may also hold one of the negative sentinels from [`crate::status`].
/// `body` is `None` when no body was received at all, which differs from an
/// empty body.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: Option<i32>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpResponse {
    /// A response with a status code and a body.
    pub fn new(status: i32, body: impl Into<Bytes>) -> Self {
        Self {
            status: Some(status),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }
}
