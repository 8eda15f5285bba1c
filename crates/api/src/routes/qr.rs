use axum::routing::{get, post};
use axum::Router;

use crate::handlers::qr;
use crate::state::AppState;

/// Routes mounted at `/qr` (mentor/admin).
///
/// ```text
/// POST /generate              -> issue one token
/// POST /generate-bulk         -> issue up to 50 tokens atomically
/// GET  /tokens?group_id=      -> list a group's tokens
/// POST /tokens/{id}/revoke    -> revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(qr::generate))
        .route("/generate-bulk", post(qr::generate_bulk))
        .route("/tokens", get(qr::list))
        .route("/tokens/{id}/revoke", post(qr::revoke))
}
