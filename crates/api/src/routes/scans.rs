use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{attendance, scans};
use crate::state::AppState;

/// Routes mounted at `/scans` (student).
///
/// ```text
/// POST /          -> submit
/// GET  /history   -> own history (?limit=&offset=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(scans::submit))
        .route("/history", get(scans::history))
}

/// Routes mounted at `/attendance` (student).
///
/// ```text
/// GET /me?date=   -> daily record
/// ```
pub fn attendance_router() -> Router<AppState> {
    Router::new().route("/me", get(attendance::me))
}
