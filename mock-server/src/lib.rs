use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootResponse {
    pub next_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseCodeResponse {
    pub path: Option<String>,
    pub response_code: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/status/{code}", get(status))
        .route(
            "/echo",
            get(echo_query)
                .post(echo_body)
                .put(echo_body)
                .patch(echo_body)
                .delete(echo_body),
        )
        .route("/headers", get(echo_headers))
        .route("/slow/{millis}", get(slow))
        .route("/malformed", get(malformed))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        next_path: Some("nextPath".to_string()),
    })
}

async fn status(Path(code): Path<u16>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        let body = ErrorBody {
            error: format!("invalid status {code}"),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    if status == StatusCode::NO_CONTENT {
        return status.into_response();
    }

    if status.is_success() {
        let body = ResponseCodeResponse {
            path: Some(format!("/status/{code}")),
            response_code: Some(code.to_string()),
        };
        (status, Json(body)).into_response()
    } else {
        let body = ErrorBody {
            error: format!("status {code}"),
        };
        (status, Json(body)).into_response()
    }
}

async fn echo_query(Query(params): Query<BTreeMap<String, String>>) -> Json<BTreeMap<String, String>> {
    Json(params)
}

/// An empty body echoes as `null`.
async fn echo_body(body: Bytes) -> Result<Json<Value>, StatusCode> {
    if body.is_empty() {
        return Ok(Json(Value::Null));
    }
    serde_json::from_slice(&body)
        .map(Json)
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)
}

async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    let echoed = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(echoed)
}

async fn slow(Path(millis): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Json(Value::Object(Default::default()))
}

async fn malformed() -> (StatusCode, &'static str) {
    (StatusCode::OK, "<html>not json</html>")
}
