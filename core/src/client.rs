//! The request/response pipeline and its three calling styles.
//!
//! # Design
//! `NetworkManager` owns only immutable configuration behind an `Arc`: the
//! transport, the logger, the timeout and a `ResponseClassifier`. Every call
//! runs the same sequence in [`Pipeline::execute`]:
//!
//! 1. log the issued request
//! 2. build the `HttpRequest`; a build failure ends the call as `BadRequest`
//! 3. log the cURL equivalent
//! 4. send it through the transport (the only suspension point)
//! 5. map transport failures into `ClientError`
//! 6. classify status and body
//! 7. log exactly one outcome
//!
//! The await style runs that sequence directly. The callback and stream
//! styles spawn the await style on the tokio runtime and differ only in how
//! the result is handed back. Nothing is cached between calls, so repeating a
//! call repeats the whole sequence.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{FutureExt, Stream};
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::builder;
use crate::classify::{ResponseClassifier, StatusCodeHandler};
use crate::config::{NetworkConfig, StatusRange};
use crate::endpoint::Endpoint;
use crate::error::{ApiError, ClientError};
use crate::logger::{NetworkLogger, ResponseLog, TracingLogger};
use crate::transport::Transport;

/// Executes endpoints of type `Ep`, reporting failures with the consumer
/// error shape `E`.
///
/// Cloning is cheap and clones share configuration.
pub struct NetworkManager<Ep, E> {
    pipeline: Arc<Pipeline>,
    _marker: PhantomData<fn(&Ep) -> E>,
}

struct Pipeline {
    transport: Arc<dyn Transport>,
    logger: Arc<dyn NetworkLogger>,
    timeout: Duration,
    classifier: ResponseClassifier,
}

impl<Ep, E> NetworkManager<Ep, E>
where
    Ep: Endpoint,
    E: ApiError,
{
    /// A manager with default configuration and the `tracing` logger.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::builder(transport).build()
    }

    pub fn builder(transport: impl Transport + 'static) -> NetworkManagerBuilder<Ep, E> {
        NetworkManagerBuilder {
            transport: Arc::new(transport),
            config: NetworkConfig::default(),
            timeout: None,
            status_code_handler: None,
            logger: Arc::new(TracingLogger),
            _marker: PhantomData,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.pipeline.timeout
    }

    /// Run the pipeline and return the decoded payload.
    pub async fn request<T>(&self, endpoint: &Ep) -> Result<T, ClientError<E>>
    where
        T: DeserializeOwned,
    {
        let span = tracing::info_span!(
            "request",
            method = %endpoint.method(),
            url = %endpoint.url()
        );
        self.pipeline.execute(endpoint).instrument(span).await
    }
}

impl<Ep, E> NetworkManager<Ep, E>
where
    Ep: Endpoint + 'static,
    E: ApiError,
{
    /// Run the pipeline on a background task and hand the result to
    /// `completion`, which is invoked exactly once. A panic inside the
    /// pipeline, for example in a logger, is reported as `NetworkError`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_with<T, F>(&self, endpoint: Ep, completion: F) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, ClientError<E>>) + Send + 'static,
    {
        let manager = self.clone();
        tokio::spawn(async move {
            let result = AssertUnwindSafe(manager.request::<T>(&endpoint))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    tracing::error!("request pipeline panicked");
                    Err(ClientError::NetworkError)
                });
            completion(result);
        })
    }

    /// A cold, single-value publisher for `endpoint`.
    ///
    /// Nothing runs until [`RequestPublisher::subscribe`] is called, and
    /// every subscription runs the whole pipeline again.
    pub fn publisher<T>(&self, endpoint: Ep) -> RequestPublisher<Ep, E, T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        RequestPublisher {
            manager: self.clone(),
            endpoint: Arc::new(endpoint),
            _marker: PhantomData,
        }
    }
}

impl<Ep, E> Clone for NetworkManager<Ep, E> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            _marker: PhantomData,
        }
    }
}

impl<Ep, E> fmt::Debug for NetworkManager<Ep, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkManager")
            .field("timeout", &self.pipeline.timeout)
            .field("classifier", &self.pipeline.classifier)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    async fn execute<T, E>(&self, endpoint: &dyn Endpoint) -> Result<T, ClientError<E>>
    where
        T: DeserializeOwned,
        E: ApiError,
    {
        self.logger.log_request(endpoint);

        let request = match builder::make_request(endpoint, self.timeout) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(error = %err, "request could not be built");
                return Err(self.fail(endpoint, ClientError::BadRequest, None));
            }
        };

        self.logger.log_curl(&request);

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "transport failed");
                return Err(self.fail(endpoint, ClientError::from(err), None));
            }
        };

        match self.classifier.classify::<T, E>(&response) {
            Ok(payload) => {
                self.logger.log_response(ResponseLog::Success {
                    body: response.body.as_deref().unwrap_or_default(),
                    endpoint,
                });
                Ok(payload)
            }
            Err(err) => {
                let body = match err {
                    ClientError::HandledError(_) => response.body.as_deref(),
                    _ => None,
                };
                Err(self.fail(endpoint, err, body))
            }
        }
    }

    fn fail<E: ApiError>(
        &self,
        endpoint: &dyn Endpoint,
        error: ClientError<E>,
        body: Option<&[u8]>,
    ) -> ClientError<E> {
        self.logger.log_response(ResponseLog::Failure {
            reason: &error.debug_message(),
            endpoint,
            body,
        });
        error
    }
}

/// Configures a [`NetworkManager`]. Settings are frozen by `build`.
pub struct NetworkManagerBuilder<Ep, E> {
    transport: Arc<dyn Transport>,
    config: NetworkConfig,
    timeout: Option<Duration>,
    status_code_handler: Option<StatusCodeHandler>,
    logger: Arc<dyn NetworkLogger>,
    _marker: PhantomData<fn(&Ep) -> E>,
}

impl<Ep, E> NetworkManagerBuilder<Ep, E>
where
    Ep: Endpoint,
    E: ApiError,
{
    /// Replace timeout, success range and tracked codes at once.
    pub fn config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self.timeout = None;
        self
    }

    /// Use `timeout` exactly, overriding the configured seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn success_status_codes(mut self, range: impl Into<StatusRange>) -> Self {
        self.config.success_status_codes = range.into();
        self
    }

    /// Failure status codes that should trigger the status code handler.
    pub fn track_status_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.config.tracked_status_codes = codes.into_iter().collect();
        self
    }

    pub fn status_code_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.status_code_handler = Some(Arc::new(handler));
        self
    }

    pub fn logger(mut self, logger: impl NetworkLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn build(self) -> NetworkManager<Ep, E> {
        let classifier = ResponseClassifier::new(&self.config, self.status_code_handler);
        NetworkManager {
            pipeline: Arc::new(Pipeline {
                transport: self.transport,
                logger: self.logger,
                timeout: self.timeout.unwrap_or_else(|| self.config.timeout()),
                classifier,
            }),
            _marker: PhantomData,
        }
    }
}

/// Cold single-value publisher returned by [`NetworkManager::publisher`].
pub struct RequestPublisher<Ep, E, T> {
    manager: NetworkManager<Ep, E>,
    endpoint: Arc<Ep>,
    _marker: PhantomData<fn() -> T>,
}

impl<Ep, E, T> RequestPublisher<Ep, E, T>
where
    Ep: Endpoint + 'static,
    E: ApiError,
    T: DeserializeOwned + Send + 'static,
{
    /// Start the pipeline on a background task.
    ///
    /// The returned stream yields exactly one `Result` and then ends. If the
    /// pipeline panics that result is `NetworkError`. Must be called from
    /// within a tokio runtime.
    pub fn subscribe(&self) -> Subscription<T, E> {
        let (sender, receiver) = oneshot::channel();
        let manager = self.manager.clone();
        let endpoint = Arc::clone(&self.endpoint);
        let task = tokio::spawn(async move {
            let result = manager.request::<T>(&endpoint).await;
            // The subscriber may already be gone.
            let _ = sender.send(result);
        });
        Subscription {
            receiver: Some(receiver),
            task,
        }
    }
}

impl<Ep, E, T> Clone for RequestPublisher<Ep, E, T> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            endpoint: Arc::clone(&self.endpoint),
            _marker: PhantomData,
        }
    }
}

/// One subscription to a [`RequestPublisher`].
///
/// Dropping it stops delivery and aborts the background task. Whether an
/// in-flight transport call is interrupted depends on the transport.
pub struct Subscription<T, E> {
    receiver: Option<oneshot::Receiver<Result<T, ClientError<E>>>>,
    task: JoinHandle<()>,
}

impl<T, E> Stream for Subscription<T, E> {
    type Item = Result<T, ClientError<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(receiver) = this.receiver.as_mut() else {
            return Poll::Ready(None);
        };
        match Pin::new(receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => {
                this.receiver = None;
                // The task only drops the sender without sending by panicking.
                Poll::Ready(Some(result.unwrap_or_else(|_| {
                    tracing::error!("request pipeline panicked");
                    Err(ClientError::NetworkError)
                })))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.receiver {
            Some(_) => (1, Some(1)),
            None => (0, Some(0)),
        }
    }
}

impl<T, E> Drop for Subscription<T, E> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
