//! Gateway router: `/api/*` proxy, sign-in callback, and guarded static pages.

use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderName, StatusCode};
use axum::routing::{any, get};
use axum::{middleware, Json, Router};
use serde::Serialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::GatewayState;
use crate::{callback, guard, proxy};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    upstream_configured: bool,
}

async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        upstream_configured: state.config.upstream_url.is_some(),
    })
}

/// Build the gateway [`Router`] with its middleware stack.
///
/// The page guard wraps every route but only acts on protected page
/// prefixes, so `/api/*` and `/auth/callback` pass straight through.
pub fn build_gateway_router(state: GatewayState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let static_files = ServeDir::new(&state.config.static_dir);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(health))
        .route("/api/{*path}", any(proxy::forward))
        .route("/auth/callback", get(callback::callback))
        .fallback_service(static_files)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::page_guard,
        ))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            timeout,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}
