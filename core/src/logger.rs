//! Observation hooks for issued requests and their outcomes.
//!
//! The pipeline reports each call to a [`NetworkLogger`] in a fixed order:
//! the issued request, its cURL equivalent, then exactly one outcome. A
//! request that fails to build skips the cURL step.

use crate::endpoint::Endpoint;
use crate::http::HttpRequest;

const TARGET: &str = "netkit::network";
const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Outcome of one call as seen by the logger.
pub enum ResponseLog<'a> {
    Success {
        body: &'a [u8],
        endpoint: &'a dyn Endpoint,
    },
    Failure {
        reason: &'a str,
        endpoint: &'a dyn Endpoint,
        body: Option<&'a [u8]>,
    },
}

/// Side-effect-only sink for pipeline observations.
///
/// Implementations must not panic and should return quickly; they run
/// inline on the calling task.
pub trait NetworkLogger: Send + Sync {
    fn log_request(&self, endpoint: &dyn Endpoint);

    fn log_curl(&self, request: &HttpRequest);

    fn log_response(&self, outcome: ResponseLog<'_>);
}

/// Default logger emitting `tracing` events at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl NetworkLogger for TracingLogger {
    fn log_request(&self, endpoint: &dyn Endpoint) {
        tracing::info!(
            target: TARGET,
            "{DIVIDER} REQUEST {DIVIDER}\nEndpoint: {}",
            endpoint.description()
        );
    }

    fn log_curl(&self, request: &HttpRequest) {
        tracing::info!(target: TARGET, "{DIVIDER} cURL {DIVIDER}\n{}", request.curl_string());
    }

    fn log_response(&self, outcome: ResponseLog<'_>) {
        match outcome {
            ResponseLog::Success { body, endpoint } => {
                tracing::info!(
                    target: TARGET,
                    "{DIVIDER} SUCCESS RESPONSE {DIVIDER}\nURL: {}\nDATA: {}",
                    endpoint.url(),
                    pretty_json(Some(body))
                );
            }
            ResponseLog::Failure {
                reason,
                endpoint,
                body,
            } => {
                tracing::info!(
                    target: TARGET,
                    "{DIVIDER} FAILURE RESPONSE {DIVIDER}\nURL: {}\nREASON: {reason}\nDATA: {}",
                    endpoint.url(),
                    pretty_json(body)
                );
            }
        }
    }
}

/// Pretty-print a JSON body, or `EMPTY RESPONSE` when there is nothing
/// printable.
pub fn pretty_json(body: Option<&[u8]>) -> String {
    body.and_then(|bytes| serde_json::from_slice::<serde_json::Value>(bytes).ok())
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| "EMPTY RESPONSE".to_string())
}
