use axum::routing::{get, post};
use axum::Router;

use crate::handlers::enrollments;
use crate::state::AppState;

/// Routes mounted at `/enrollments`.
///
/// ```text
/// GET  /                -> list (admin, ?status=&limit=&offset=)
/// POST /                -> select a skill (student)
/// GET  /me              -> own enrollment + scan eligibility (student)
/// POST /{id}/pay        -> confirm payment (student owner)
/// POST /{id}/assign     -> allocate a group (admin)
/// POST /{id}/complete   -> close an active enrollment (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(enrollments::list).post(enrollments::create))
        .route("/me", get(enrollments::me))
        .route("/{id}/pay", post(enrollments::pay))
        .route("/{id}/assign", post(enrollments::assign))
        .route("/{id}/complete", post(enrollments::complete))
}
