//! Pure `Endpoint` to `HttpRequest` construction.
//!
//! # Design
//! Building never performs I/O and never panics: a malformed URL or
//! unrepresentable parameters come back as a [`BuildError`], which the
//! pipeline turns into `ClientError::BadRequest` before any transport call.

use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::endpoint::{Endpoint, Params};
use crate::headers::HttpHeaders;
use crate::http::{HttpRequest, ParameterEncoding};

/// Why an endpoint could not be turned into a request.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("parameters could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Build the request described by `endpoint` with the given timeout.
pub fn make_request<Ep>(endpoint: &Ep, timeout: Duration) -> Result<HttpRequest, BuildError>
where
    Ep: Endpoint + ?Sized,
{
    let raw_url = endpoint.url();
    let mut url = Url::parse(&raw_url).map_err(|source| BuildError::InvalidUrl {
        url: raw_url.clone(),
        source,
    })?;

    let mut body = None;
    if let Some(params) = endpoint.params().filter(|p| !p.is_empty()) {
        match endpoint.encoding() {
            ParameterEncoding::Url => append_query_items(&mut url, &params),
            ParameterEncoding::Json => {
                let json = serde_json::to_vec(&params)?;
                body = Some(Bytes::from(json));
            }
        }
    }

    let request = HttpRequest {
        method: endpoint.method(),
        url,
        headers: HttpHeaders::new(),
        body,
        timeout,
    };

    let headers = endpoint
        .default_headers()
        .merge(&endpoint.headers().unwrap_or_default());
    Ok(headers.embed(request))
}

fn append_query_items(url: &mut Url, params: &Params) {
    let mut pairs = url.query_pairs_mut();
    for (name, value) in params {
        pairs.append_pair(name, &query_value(value));
    }
}

/// Default string form of a parameter value: strings unquoted, everything
/// else as its JSON text.
fn query_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
