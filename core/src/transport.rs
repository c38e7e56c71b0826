//! The seam between the pipeline and whatever performs network I/O.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::http::{HttpRequest, HttpResponse};

/// Failure of the transport itself, before any HTTP response was produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request exceeded `HttpRequest::timeout`.
    #[error("request timed out")]
    TimedOut,

    /// The transport refused the request as built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

/// Executes built requests.
///
/// Implementations must honor `HttpRequest::timeout`. A response with any
/// status, including 4xx and 5xx, is a success at this level; only failures
/// to obtain a response are `TransportError`s.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        (**self).send(request)
    }
}
