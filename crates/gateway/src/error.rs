use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors the gateway reports itself, as opposed to upstream responses it
/// relays unchanged.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Upstream API URL is not configured")]
    NotConfigured,

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::NotConfigured => {
                tracing::error!("UPSTREAM_API_URL is not set; refusing to proxy");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server misconfigured: upstream API URL is not set".to_string(),
                )
            }
            GatewayError::Upstream(err) => {
                tracing::error!(error = %err, "Upstream request failed");
                let detail = if err.is_timeout() {
                    "upstream timed out"
                } else {
                    "upstream unreachable"
                };
                (StatusCode::BAD_GATEWAY, format!("Bad Gateway: {detail}"))
            }
            GatewayError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}
