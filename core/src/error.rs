//! Client-facing error taxonomy.
//!
//! # Design
//! Every failure leaving the pipeline is exactly one [`ClientError`] variant;
//! raw transport and decode errors never reach the caller. The only variant
//! carrying consumer data is `HandledError`, which wraps the consumer's own
//! error body (any type implementing [`ApiError`]). Each variant exposes a
//! short UI `message`, a verbose `debug_message` and a `status_code` that is
//! always populated, using the sentinels in [`crate::status`] for failures
//! that had no HTTP status.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::decode::DecodeFailure;
use crate::status;
use crate::transport::TransportError;

/// Shape of the error body a consumer's API returns on failure.
///
/// After decoding, the pipeline stores the observed HTTP status through
/// [`ApiError::set_status_code`], so the value carries the status that
/// produced it.
pub trait ApiError: DeserializeOwned + Send + 'static {
    /// Human readable error text from the body.
    fn error(&self) -> &str;

    fn status_code(&self) -> Option<i32>;

    fn set_status_code(&mut self, status_code: Option<i32>);
}

/// Errors returned by every `NetworkManager` request style.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError<E> {
    /// The body of a non-success response decoded into the consumer's shape.
    HandledError(E),

    /// The server could not be reached or returned no usable response.
    NetworkError,

    /// A body could not be decoded into the expected type.
    DecodingError(Option<DecodeFailure>),

    Timeout,

    /// The endpoint could not be turned into a request. The transport was
    /// never called.
    BadRequest,
}

impl<E: ApiError> ClientError<E> {
    /// Short, stable text suitable for display.
    pub fn message(&self) -> String {
        match self {
            ClientError::HandledError(error) => error.error().to_string(),
            ClientError::NetworkError => "Could not connect to the server".to_string(),
            ClientError::DecodingError(_) => "Failed to decode response".to_string(),
            ClientError::Timeout => "Request timed out".to_string(),
            ClientError::BadRequest => "Bad request".to_string(),
        }
    }

    /// Verbose text for logs, including decode diagnostics when present.
    pub fn debug_message(&self) -> String {
        match self {
            ClientError::HandledError(error) => error.error().to_string(),
            ClientError::NetworkError => "Network error".to_string(),
            ClientError::DecodingError(None) => "Decoding Error".to_string(),
            ClientError::DecodingError(Some(failure)) => format!("Decoding Error: {failure}"),
            ClientError::Timeout => "Timeout".to_string(),
            ClientError::BadRequest => "Bad request".to_string(),
        }
    }

    pub fn status_code(&self) -> i32 {
        match self {
            ClientError::HandledError(error) => error.status_code().unwrap_or(0),
            ClientError::NetworkError => status::NOT_CONNECTED_TO_INTERNET,
            ClientError::DecodingError(_) => status::CANNOT_DECODE_RAW_DATA,
            ClientError::Timeout => status::TIMED_OUT,
            ClientError::BadRequest => status::BAD_REQUEST,
        }
    }

    /// The consumer's error body, if this is a `HandledError`.
    pub fn handled(&self) -> Option<&E> {
        match self {
            ClientError::HandledError(error) => Some(error),
            _ => None,
        }
    }
}

impl<E: ApiError> fmt::Display for ClientError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl<E: ApiError + fmt::Debug> std::error::Error for ClientError<E> {}

/// Transport failures that already name one of our kinds pass through as
/// that kind; everything else is a `NetworkError`.
impl<E> From<TransportError> for ClientError<E> {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::TimedOut => ClientError::Timeout,
            TransportError::InvalidRequest(_) => ClientError::BadRequest,
            TransportError::Connect(_) | TransportError::Other(_) => ClientError::NetworkError,
        }
    }
}
