//! Stub upstream API and gateway builder for proxy tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{OriginalUri, Path, RawQuery, State};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use vocatrack_gateway::config::GatewayConfig;
use vocatrack_gateway::router::build_gateway_router;
use vocatrack_gateway::state::GatewayState;

/// One request as the stub upstream saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    /// The path as it arrived on the wire, before percent-decoding.
    pub raw_path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub cookie: Option<String>,
    pub body: Bytes,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Captured>>>);

impl Recorder {
    pub fn requests(&self) -> Vec<Captured> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Captured {
        self.requests().pop().expect("upstream received a request")
    }
}

async fn stub(
    State(recorder): State<Recorder>,
    Path(path): Path<String>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    recorder.0.lock().unwrap().push(Captured {
        method,
        path: path.clone(),
        raw_path: uri.path().trim_start_matches("/api/").to_string(),
        query,
        authorization: authorization.clone(),
        cookie: headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    match path.as_str() {
        "v1/users/auth/login" => (
            [("set-cookie", "upstream_session=leak"), ("x-upstream", "login")],
            Json(json!({"data": {
                "access_token": "tok-login",
                "token_type": "Bearer",
                "expires_in": 3600,
                "user": {"id": 1, "role": "mentor"}
            }})),
        )
            .into_response(),
        "v1/users/auth/refresh" => Json(json!({"data": {"access_token": "tok-refresh"}})).into_response(),
        "v1/users/auth/bad-login" => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid username or password", "code": "UNAUTHORIZED"})),
        )
            .into_response(),
        "v1/users/auth/logout" => StatusCode::NO_CONTENT.into_response(),
        "v1/users/auth/me" => match authorization.as_deref() {
            Some("Bearer student-token") => {
                Json(json!({"data": {"id": 2, "role": "student"}})).into_response()
            }
            Some("Bearer admin-token") => {
                Json(json!({"data": {"id": 3, "role": "admin"}})).into_response()
            }
            _ => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid token", "code": "UNAUTHORIZED"})),
            )
                .into_response(),
        },
        _ => (
            StatusCode::CREATED,
            [("set-cookie", "tracking=1"), ("x-upstream", "echo")],
            Json(json!({"data": {"ok": true}})),
        )
            .into_response(),
    }
}

/// Start the stub API on an ephemeral port. Returns its `/api` base URL.
pub async fn spawn_upstream() -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/api/{*path}", any(stub))
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api"), recorder)
}

/// An address nothing is listening on.
pub async fn closed_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub fn test_config(upstream_url: Option<String>) -> GatewayConfig {
    GatewayConfig {
        host: "127.0.0.1".into(),
        port: 0,
        upstream_url,
        app_env: "development".into(),
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/public").into(),
        upstream_timeout_secs: 5,
        request_timeout_secs: 10,
    }
}

pub fn build_gateway(config: GatewayConfig) -> Router {
    build_gateway_router(GatewayState::new(config).unwrap())
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}
