//! Generic HTTP client pipeline driven by declarative endpoints.
//!
//! # Overview
//! A consumer describes each API call as an [`Endpoint`], picks a payload
//! type and an [`ApiError`] shape for failure bodies, and asks a
//! [`NetworkManager`] to run it. The manager builds the request, hands it to
//! a host-supplied [`Transport`], classifies the response by status code
//! and returns `Result<T, ClientError<E>>`.
//!
//! # Design
//! - The core performs no network I/O (host-does-IO pattern). `builder` and
//!   `classify` are pure and usable on their own; `client` composes them
//!   around the transport call.
//! - Three calling styles share one pipeline: `request` (await),
//!   `request_with` (callback on a spawned task) and `publisher` (a cold,
//!   single-value `Stream` per subscription).
//! - Every failure is normalized into one [`ClientError`] variant.
//!
//! # Example
//! ```ignore
//! let manager = NetworkManager::<Api, ServiceError>::builder(transport)
//!     .timeout(Duration::from_secs(5))
//!     .track_status_codes([401])
//!     .status_code_handler(|code| tracing::warn!(code, "session expired"))
//!     .build();
//!
//! let root: Root = manager.request(&Api::Root).await?;
//! ```

pub mod builder;
pub mod classify;
pub mod client;
pub mod config;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod headers;
pub mod http;
pub mod logger;
pub mod status;
pub mod transport;

pub use builder::{make_request, BuildError};
pub use classify::{ResponseClassifier, StatusCodeHandler};
pub use client::{NetworkManager, NetworkManagerBuilder, RequestPublisher, Subscription};
pub use config::{NetworkConfig, StatusRange};
pub use decode::{DecodeCategory, DecodeFailure, EmptyResponse, JsonDecoder};
pub use endpoint::{Endpoint, Params};
pub use error::{ApiError, ClientError};
pub use headers::{HttpHeader, HttpHeaders};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ParameterEncoding};
pub use logger::{NetworkLogger, ResponseLog, TracingLogger};
pub use transport::{Transport, TransportError};
