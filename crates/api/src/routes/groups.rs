use axum::routing::get;
use axum::Router;

use crate::handlers::groups;
use crate::state::AppState;

/// Routes mounted at `/groups`.
///
/// ```text
/// GET    /{id}                     -> get_by_id
/// PUT    /{id}                     -> update (admin)
/// DELETE /{id}                     -> delete (admin)
/// GET    /{id}/statistics          -> capacity and scan totals
/// GET    /{id}/members             -> seated students (mentor/admin)
/// GET    /{id}/attendance-report   -> report (mentor/admin)
/// GET    /{id}/requirements        -> requirements (mentor/admin)
/// PUT    /{id}/requirements        -> set one date's requirement (mentor/admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(groups::get_by_id)
                .put(groups::update)
                .delete(groups::delete),
        )
        .route("/{id}/statistics", get(groups::statistics))
        .route("/{id}/members", get(groups::members))
        .route("/{id}/attendance-report", get(groups::attendance_report))
        .route(
            "/{id}/requirements",
            get(groups::requirements).put(groups::set_requirement),
        )
}
