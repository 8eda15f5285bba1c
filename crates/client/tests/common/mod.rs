//! Stub API server for client tests.
#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use vocatrack_client::{ApiClient, ClientConfig};

/// Serve `router` on an ephemeral port and return its `/api` base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api/")
}

/// Config with short retry delays so tests finish quickly.
pub fn fast_config(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url)
        .with_request_timeout(Duration::from_secs(2))
        .with_scan_retry_delays(vec![Duration::from_millis(10), Duration::from_millis(10)])
}

pub fn client(config: &ClientConfig) -> ApiClient {
    ApiClient::new(config).unwrap().with_token("student-token")
}

pub fn receipt_body(scan_id: i64, replayed: bool) -> Value {
    json!({
        "data": {
            "scan_id": scan_id,
            "points_awarded": 1,
            "created_at": "2026-10-14T09:00:00Z",
            "completed_count": 1,
            "required_count": 3,
            "replayed": replayed
        }
    })
}

pub fn history_body() -> Value {
    json!({
        "data": [{
            "id": 1,
            "group_id": 7,
            "group_number": 1,
            "skill_title": "Welding",
            "label": "Station 1",
            "scan_date": "2026-10-14",
            "points_awarded": 1,
            "created_at": "2026-10-14T09:00:00Z"
        }]
    })
}
