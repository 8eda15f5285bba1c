use axum::routing::get;
use axum::Router;

use crate::handlers::{groups, skills};
use crate::state::AppState;

/// Routes mounted at `/skills`.
///
/// ```text
/// GET    /                    -> list (?academic_session_id=)
/// POST   /                    -> create (admin)
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update (admin)
/// DELETE /{id}                -> delete (admin)
/// GET    /{skill_id}/groups   -> list groups
/// POST   /{skill_id}/groups   -> create group (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(skills::list).post(skills::create))
        .route(
            "/{id}",
            get(skills::get_by_id)
                .put(skills::update)
                .delete(skills::delete),
        )
        .route(
            "/{skill_id}/groups",
            get(groups::list_for_skill).post(groups::create),
        )
}
