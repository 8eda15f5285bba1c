use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET /admin     -> admin summary
/// GET /mentor    -> mentor's groups (admins see all)
/// GET /student   -> student's eligibility and today's progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard::admin))
        .route("/mentor", get(dashboard::mentor))
        .route("/student", get(dashboard::student))
}
