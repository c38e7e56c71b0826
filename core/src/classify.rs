//! Status-code-driven classification of transport responses.
//!
//! # Design
//! `ResponseClassifier` is pure apart from the optional tracked-status
//! notification. It is built once from a `NetworkConfig` and shared by every
//! call, so it holds only immutable configuration and a stateless decoder.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::{NetworkConfig, StatusRange};
use crate::decode::JsonDecoder;
use crate::error::{ApiError, ClientError};
use crate::http::HttpResponse;
use crate::status;

/// Notified with the status code of failed responses whose code is tracked.
pub type StatusCodeHandler = Arc<dyn Fn(i32) + Send + Sync>;

#[derive(Clone)]
pub struct ResponseClassifier {
    success_status_codes: StatusRange,
    tracked_status_codes: Vec<i32>,
    status_code_handler: Option<StatusCodeHandler>,
    decoder: JsonDecoder,
}

impl ResponseClassifier {
    pub fn new(config: &NetworkConfig, status_code_handler: Option<StatusCodeHandler>) -> Self {
        Self {
            success_status_codes: config.success_status_codes,
            tracked_status_codes: config.tracked_status_codes.clone(),
            status_code_handler,
            decoder: JsonDecoder,
        }
    }

    /// Turn a raw response into the payload or a `ClientError`.
    ///
    /// - no status: `NetworkError`
    /// - status in the success range: decode the body as `T`, short-cutting
    ///   an empty body to `T`'s canonical empty value when it has one
    /// - any other status: see [`ResponseClassifier::classify_failure`]
    pub fn classify<T, E>(&self, response: &HttpResponse) -> Result<T, ClientError<E>>
    where
        T: DeserializeOwned,
        E: ApiError,
    {
        let Some(status) = response.status else {
            tracing::debug!("response carried no status code");
            return Err(ClientError::NetworkError);
        };

        if !self.success_status_codes.contains(status) {
            return Err(self.classify_failure(status, response.body.as_deref()));
        }

        let body = response.body.as_deref().unwrap_or_default();
        if body.is_empty() {
            if let Some(empty) = self.decoder.empty::<T>() {
                tracing::debug!(status, "empty body decoded as canonical empty value");
                return Ok(empty);
            }
        }

        self.decoder
            .decode(body)
            .map_err(|failure| ClientError::DecodingError(Some(failure)))
    }

    /// Classify a status outside the success range.
    ///
    /// The timeout sentinel wins over everything else. Tracked codes notify
    /// the handler before the body is looked at. A missing body is a
    /// `NetworkError`; a body that decodes as `E` becomes a `HandledError`
    /// stamped with `status`; anything else is a `DecodingError`.
    pub fn classify_failure<E: ApiError>(&self, status: i32, body: Option<&[u8]>) -> ClientError<E> {
        if status == status::TIMED_OUT {
            return ClientError::Timeout;
        }

        if self.tracked_status_codes.contains(&status) {
            if let Some(handler) = &self.status_code_handler {
                tracing::debug!(status, "notifying tracked status code");
                handler(status);
            }
        }

        let Some(body) = body else {
            return ClientError::NetworkError;
        };

        match self.decoder.decode::<E>(body) {
            Ok(mut error) => {
                error.set_status_code(Some(status));
                ClientError::HandledError(error)
            }
            Err(failure) => ClientError::DecodingError(Some(failure)),
        }
    }
}

impl fmt::Debug for ResponseClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseClassifier")
            .field("success_status_codes", &self.success_status_codes)
            .field("tracked_status_codes", &self.tracked_status_codes)
            .field("status_code_handler", &self.status_code_handler.is_some())
            .finish()
    }
}
