//! Drive every calling style of `NetworkManager` against a stub transport.
//!
//! # Design
//! The stub returns one canned outcome, counts how often it is called and
//! keeps every request it saw. A recording logger captures the observation
//! sequence so ordering can be asserted.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::StreamExt;
use netkit_core::{
    ApiError, ClientError, EmptyResponse, Endpoint, HttpHeaders, HttpMethod, HttpRequest,
    HttpResponse, NetworkLogger, NetworkManager, Params, ResponseLog, Transport, TransportError,
};
use serde::Deserialize;
use serde_json::json;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RootResponse {
    next_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ServiceError {
    error: String,
    #[serde(default)]
    status_code: Option<i32>,
}

impl ApiError for ServiceError {
    fn error(&self) -> &str {
        &self.error
    }

    fn status_code(&self) -> Option<i32> {
        self.status_code
    }

    fn set_status_code(&mut self, status_code: Option<i32>) {
        self.status_code = status_code;
    }
}

#[derive(Debug, Clone)]
enum Api {
    Root,
    Broken,
    Search { title: String, page: u32 },
    SaveMovie { name: String },
}

impl Endpoint for Api {
    fn base_url(&self) -> String {
        match self {
            Api::Broken => "h t t p://localhost:8000".to_string(),
            _ => "http://localhost:8000".to_string(),
        }
    }

    fn path(&self) -> String {
        match self {
            Api::Root | Api::Broken => String::new(),
            Api::Search { .. } => "/search".to_string(),
            Api::SaveMovie { .. } => "/movie".to_string(),
        }
    }

    fn method(&self) -> HttpMethod {
        match self {
            Api::SaveMovie { .. } => HttpMethod::POST,
            _ => HttpMethod::GET,
        }
    }

    fn params(&self) -> Option<Params> {
        match self {
            Api::Search { title, page } => json!({"title": title, "page": page}).as_object().cloned(),
            Api::SaveMovie { name } => json!({"name": name}).as_object().cloned(),
            _ => None,
        }
    }

    fn headers(&self) -> Option<HttpHeaders> {
        let mut headers = HttpHeaders::new();
        headers.insert("Authorization", "Test token");
        Some(headers)
    }
}

#[derive(Clone)]
struct StubTransport {
    outcome: Result<HttpResponse, TransportError>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl StubTransport {
    fn new(outcome: Result<HttpResponse, TransportError>) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn responding(status: i32, body: &'static str) -> Self {
        Self::new(Ok(HttpResponse::new(status, body)))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

/// Answers `200 {}` after `delay`, recording whether it got that far.
#[derive(Clone)]
struct SlowTransport {
    delay: Duration,
    finished: Arc<AtomicBool>,
}

impl SlowTransport {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Transport for SlowTransport {
    fn send(&self, _request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(HttpResponse::new(200, "{}"))
        })
    }
}

#[derive(Clone, Default)]
struct RecordingLogger {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl NetworkLogger for RecordingLogger {
    fn log_request(&self, _endpoint: &dyn Endpoint) {
        self.events.lock().unwrap().push("request".to_string());
    }

    fn log_curl(&self, _request: &HttpRequest) {
        self.events.lock().unwrap().push("curl".to_string());
    }

    fn log_response(&self, outcome: ResponseLog<'_>) {
        let event = match outcome {
            ResponseLog::Success { .. } => "success".to_string(),
            ResponseLog::Failure { reason, .. } => format!("failure: {reason}"),
        };
        self.events.lock().unwrap().push(event);
    }
}

/// Logger that panics while rendering the cURL line.
struct PanickingLogger;

impl NetworkLogger for PanickingLogger {
    fn log_request(&self, _endpoint: &dyn Endpoint) {}

    fn log_curl(&self, _request: &HttpRequest) {
        panic!("logger failure");
    }

    fn log_response(&self, _outcome: ResponseLog<'_>) {}
}

type Manager = NetworkManager<Api, ServiceError>;
type Outcome<T> = Result<T, ClientError<ServiceError>>;

fn manager(transport: &StubTransport) -> Manager {
    NetworkManager::new(transport.clone())
}

/// Run `endpoint` through all three calling styles, in order.
async fn all_styles<T>(manager: &Manager, endpoint: Api) -> Vec<Outcome<T>>
where
    T: serde::de::DeserializeOwned + Send + 'static,
{
    let awaited = manager.request::<T>(&endpoint).await;

    let (tx, rx) = tokio::sync::oneshot::channel();
    manager.request_with::<T, _>(endpoint.clone(), move |result| {
        let _ = tx.send(result);
    });
    let called_back = rx.await.unwrap();

    let mut streamed: Vec<Outcome<T>> = manager.publisher::<T>(endpoint).subscribe().collect().await;
    assert_eq!(streamed.len(), 1, "stream must yield exactly one value");

    vec![awaited, called_back, streamed.remove(0)]
}

// ---------------------------------------------------------------------------
// Scenarios shared by all calling styles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_succeeds_in_every_style() {
    let transport = StubTransport::responding(200, r#"{"next_path":"nextPath"}"#);
    let manager = manager(&transport);

    for result in all_styles::<RootResponse>(&manager, Api::Root).await {
        assert_eq!(
            result.unwrap(),
            RootResponse {
                next_path: Some("nextPath".to_string())
            }
        );
    }
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn connection_failure_is_network_error_in_every_style() {
    let transport = StubTransport::new(Err(TransportError::Connect("Connection Failed".into())));
    let manager = manager(&transport);

    for result in all_styles::<RootResponse>(&manager, Api::Root).await {
        let err = result.unwrap_err();
        assert_eq!(err, ClientError::NetworkError);
        assert_eq!(err.message(), "Could not connect to the server");
        assert_eq!(err.status_code(), -1009);
    }
}

#[tokio::test]
async fn malformed_url_is_bad_request_without_transport_call() {
    let transport = StubTransport::responding(200, r#"{"next_path":"nextPath"}"#);
    let manager = manager(&transport);

    for result in all_styles::<RootResponse>(&manager, Api::Broken).await {
        let err = result.unwrap_err();
        assert_eq!(err, ClientError::BadRequest);
        assert_eq!(err.message(), "Bad request");
        assert_eq!(err.debug_message(), "Bad request");
        assert_eq!(err.status_code(), 400);
    }
    assert_eq!(transport.calls(), 0);
}

// ---------------------------------------------------------------------------
// Observation order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn success_logs_request_curl_then_outcome() {
    let transport = StubTransport::responding(200, r#"{"next_path":"nextPath"}"#);
    let logger = RecordingLogger::default();
    let manager: Manager = NetworkManager::builder(transport.clone())
        .logger(logger.clone())
        .build();

    manager.request::<RootResponse>(&Api::Root).await.unwrap();
    assert_eq!(logger.events(), vec!["request", "curl", "success"]);
}

#[tokio::test]
async fn bad_request_skips_curl() {
    let transport = StubTransport::responding(200, "{}");
    let logger = RecordingLogger::default();
    let manager: Manager = NetworkManager::builder(transport.clone())
        .logger(logger.clone())
        .build();

    let _ = manager.request::<RootResponse>(&Api::Broken).await;
    assert_eq!(logger.events(), vec!["request", "failure: Bad request"]);
}

#[tokio::test]
async fn handled_error_logs_consumer_message() {
    let transport = StubTransport::responding(404, r#"{"error":"Movie not found"}"#);
    let logger = RecordingLogger::default();
    let manager: Manager = NetworkManager::builder(transport.clone())
        .logger(logger.clone())
        .build();

    let _ = manager.request::<RootResponse>(&Api::Root).await;
    assert_eq!(logger.events(), vec!["request", "curl", "failure: Movie not found"]);
}

#[tokio::test]
async fn decoding_failure_logs_once() {
    let transport = StubTransport::responding(200, "<html>");
    let logger = RecordingLogger::default();
    let manager: Manager = NetworkManager::builder(transport.clone())
        .logger(logger.clone())
        .build();

    let _ = manager.request::<RootResponse>(&Api::Root).await;
    let events = logger.events();
    assert_eq!(events.len(), 3);
    assert!(events[2].starts_with("failure: Decoding Error: Syntax error"));
}

// ---------------------------------------------------------------------------
// Request construction as seen by the transport
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_params_reach_transport_as_query() {
    let transport = StubTransport::responding(200, "{}");
    let manager = manager(&transport);

    let endpoint = Api::Search {
        title: "Star Wars".to_string(),
        page: 2,
    };
    let _ = manager.request::<EmptyResponse>(&endpoint).await;

    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::GET);
    assert_eq!(request.url.path(), "/search");
    let mut items: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
    items.sort();
    assert_eq!(
        items,
        vec![
            ("page".to_string(), "2".to_string()),
            ("title".to_string(), "Star Wars".to_string()),
        ]
    );
    assert!(request.body.is_none());
    assert_eq!(request.headers.get("Authorization"), Some("Test token"));
    assert_eq!(request.headers.get("Accept"), Some("application/json"));
}

#[tokio::test]
async fn post_params_reach_transport_as_body() {
    let transport = StubTransport::responding(201, "");
    let manager = manager(&transport);

    let endpoint = Api::SaveMovie {
        name: "Titanic".to_string(),
    };
    let saved: EmptyResponse = manager.request(&endpoint).await.unwrap();
    assert_eq!(saved, EmptyResponse);

    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::POST);
    let body: serde_json::Value = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"name": "Titanic"}));
}

#[tokio::test]
async fn configured_timeout_reaches_transport() {
    let transport = StubTransport::responding(200, "{}");
    let manager: Manager = NetworkManager::builder(transport.clone())
        .timeout(std::time::Duration::from_millis(1500))
        .build();

    let _ = manager.request::<EmptyResponse>(&Api::Root).await;
    assert_eq!(transport.last_request().timeout, std::time::Duration::from_millis(1500));
    assert_eq!(manager.timeout(), std::time::Duration::from_millis(1500));
}

#[tokio::test]
async fn very_long_timeout_is_kept_exactly() {
    let transport = StubTransport::responding(200, "{}");
    let long = Duration::from_secs(u64::MAX);
    let manager: Manager = NetworkManager::builder(transport.clone()).timeout(long).build();

    let _ = manager.request::<EmptyResponse>(&Api::Root).await;
    assert_eq!(transport.last_request().timeout, long);
    assert_eq!(manager.timeout(), long);
}

// ---------------------------------------------------------------------------
// Classification through the pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tracked_status_codes_notify_and_return_handled_error() {
    let transport = StubTransport::responding(401, r#"{"error":"Session expired"}"#);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let manager: Manager = NetworkManager::builder(transport.clone())
        .track_status_codes([401, 403])
        .status_code_handler(move |code| sink.lock().unwrap().push(code))
        .build();

    let err = manager.request::<RootResponse>(&Api::Root).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::HandledError(ServiceError {
            error: "Session expired".to_string(),
            status_code: Some(401),
        })
    );
    assert_eq!(err.status_code(), 401);
    assert_eq!(*seen.lock().unwrap(), vec![401]);
}

#[tokio::test]
async fn untracked_failure_does_not_notify() {
    let transport = StubTransport::responding(500, r#"{"error":"boom"}"#);
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let manager: Manager = NetworkManager::builder(transport.clone())
        .track_status_codes([401])
        .status_code_handler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let _ = manager.request::<RootResponse>(&Api::Root).await;
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn timeout_status_sentinel_is_timeout() {
    let transport = StubTransport::responding(-1001, r#"{"error":"ignored"}"#);
    let manager = manager(&transport);

    let err = manager.request::<RootResponse>(&Api::Root).await.unwrap_err();
    assert_eq!(err, ClientError::Timeout);
    assert_eq!(err.message(), "Request timed out");
}

#[tokio::test]
async fn transport_timeout_passes_through() {
    let transport = StubTransport::new(Err(TransportError::TimedOut));
    let manager = manager(&transport);

    for result in all_styles::<RootResponse>(&manager, Api::Root).await {
        assert_eq!(result.unwrap_err(), ClientError::Timeout);
    }
}

#[tokio::test]
async fn transport_rejection_passes_through_as_bad_request() {
    let transport = StubTransport::new(Err(TransportError::InvalidRequest("no host".into())));
    let manager = manager(&transport);

    let err = manager.request::<RootResponse>(&Api::Root).await.unwrap_err();
    assert_eq!(err, ClientError::BadRequest);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn missing_status_is_network_error() {
    let transport = StubTransport::new(Ok(HttpResponse::default()));
    let manager = manager(&transport);

    let err = manager.request::<RootResponse>(&Api::Root).await.unwrap_err();
    assert_eq!(err, ClientError::NetworkError);
}

#[tokio::test]
async fn wider_success_range_accepts_250() {
    let transport = StubTransport::responding(250, r#"{"next_path":null}"#);

    let narrow = manager(&transport);
    assert!(narrow.request::<RootResponse>(&Api::Root).await.is_err());

    let wide: Manager = NetworkManager::builder(transport.clone())
        .success_status_codes(200..=299)
        .build();
    let root = wide.request::<RootResponse>(&Api::Root).await.unwrap();
    assert_eq!(root.next_path, None);
}

// ---------------------------------------------------------------------------
// No hidden state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_calls_are_identical() {
    let transport = StubTransport::responding(200, r#"{"next_path":1}"#);
    let manager = manager(&transport);

    let first = manager.request::<RootResponse>(&Api::Root).await;
    let second = manager.request::<RootResponse>(&Api::Root).await;
    assert!(matches!(first, Err(ClientError::DecodingError(Some(_)))));
    assert_eq!(first, second);
}

#[tokio::test]
async fn each_subscription_reruns_the_pipeline() {
    let transport = StubTransport::responding(200, r#"{"next_path":"nextPath"}"#);
    let manager = manager(&transport);
    let publisher = manager.publisher::<RootResponse>(Api::Root);

    let mut first = publisher.subscribe();
    let mut second = publisher.clone().subscribe();
    assert!(first.next().await.unwrap().is_ok());
    assert!(first.next().await.is_none());
    assert!(second.next().await.unwrap().is_ok());
    assert!(second.next().await.is_none());

    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn publisher_is_cold_until_subscribed() {
    let transport = StubTransport::responding(200, "{}");
    let manager = manager(&transport);

    let publisher = manager.publisher::<EmptyResponse>(Api::Root);
    tokio::task::yield_now().await;
    assert_eq!(transport.calls(), 0);

    let results: Vec<_> = publisher.subscribe().collect().await;
    assert_eq!(results, vec![Ok(EmptyResponse)]);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn dropped_subscription_delivers_nothing() {
    let transport = SlowTransport::new(Duration::from_millis(100));
    let logger = RecordingLogger::default();
    let manager: Manager = NetworkManager::builder(transport.clone())
        .logger(logger.clone())
        .build();

    let subscription = manager.publisher::<EmptyResponse>(Api::Root).subscribe();
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(subscription);
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(logger.events(), vec!["request", "curl"]);
    assert!(!transport.finished.load(Ordering::SeqCst), "task kept running after drop");
}

// ---------------------------------------------------------------------------
// Panics inside the pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn panicking_pipeline_still_streams_one_value() {
    let transport = StubTransport::responding(200, "{}");
    let manager: Manager = NetworkManager::builder(transport.clone())
        .logger(PanickingLogger)
        .build();

    let results: Vec<Outcome<EmptyResponse>> =
        manager.publisher::<EmptyResponse>(Api::Root).subscribe().collect().await;
    assert_eq!(results, vec![Err(ClientError::NetworkError)]);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn panicking_pipeline_still_calls_completion() {
    let transport = StubTransport::responding(200, "{}");
    let manager: Manager = NetworkManager::builder(transport.clone())
        .logger(PanickingLogger)
        .build();

    let (tx, rx) = tokio::sync::oneshot::channel();
    manager.request_with::<EmptyResponse, _>(Api::Root, move |result| {
        let _ = tx.send(result);
    });
    assert_eq!(rx.await.unwrap(), Err(ClientError::NetworkError));
}
