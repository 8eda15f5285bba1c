use axum::routing::{get, post};
use axum::Router;

use crate::handlers::academic_sessions;
use crate::state::AppState;

/// Routes mounted at `/academic-sessions`.
///
/// ```text
/// GET    /             -> list
/// POST   /             -> create (admin)
/// GET    /active       -> resolved active session
/// GET    /{id}         -> get_by_id
/// PUT    /{id}         -> update (admin)
/// DELETE /{id}         -> delete (admin)
/// POST   /{id}/start   -> start (admin)
/// POST   /{id}/end     -> end (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(academic_sessions::list).post(academic_sessions::create),
        )
        .route("/active", get(academic_sessions::active))
        .route(
            "/{id}",
            get(academic_sessions::get_by_id)
                .put(academic_sessions::update)
                .delete(academic_sessions::delete),
        )
        .route("/{id}/start", post(academic_sessions::start))
        .route("/{id}/end", post(academic_sessions::end))
}
