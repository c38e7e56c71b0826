//! Declarative description of one API call.
//!
//! # Design
//! Consumers describe their API as a type (usually an enum with one variant
//! per call) implementing [`Endpoint`]. Only the URL parts and the method are
//! required; `url`, `encoding`, `default_headers` and `description` are
//! derived by default methods and are not meant to be stored.

use crate::headers::{HttpHeader, HttpHeaders};
use crate::http::{HttpMethod, ParameterEncoding};

/// Request parameters. Values render as query items for `GET` and as a JSON
/// object body otherwise.
pub type Params = serde_json::Map<String, serde_json::Value>;

pub trait Endpoint: Send + Sync {
    fn base_url(&self) -> String;

    fn path(&self) -> String;

    fn method(&self) -> HttpMethod;

    fn params(&self) -> Option<Params> {
        None
    }

    /// Caller headers. These win over [`Endpoint::default_headers`].
    fn headers(&self) -> Option<HttpHeaders> {
        None
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url(), self.path())
    }

    /// Query string for `GET`, JSON body for everything else.
    fn encoding(&self) -> ParameterEncoding {
        if self.method() == HttpMethod::GET {
            ParameterEncoding::Url
        } else {
            ParameterEncoding::Json
        }
    }

    fn default_headers(&self) -> HttpHeaders {
        [
            HttpHeader::new("Accept", "application/json"),
            HttpHeader::new("Cache-Control", "no-cache"),
            HttpHeader::new("Content-Type", "application/json"),
        ]
        .into_iter()
        .collect()
    }

    /// Multi-line summary of method, URL, headers and parameters for logs.
    fn description(&self) -> String {
        let params = serde_json::Value::Object(self.params().unwrap_or_default());
        format!(
            "\nURL: [{}] {}\nHEADERS: {}\nPARAMETERS: {}",
            self.method(),
            self.url(),
            self.headers().unwrap_or_default(),
            params
        )
    }
}
