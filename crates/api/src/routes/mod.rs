pub mod academic_sessions;
pub mod auth;
pub mod dashboard;
pub mod enrollments;
pub mod groups;
pub mod health;
pub mod qr;
pub mod scans;
pub mod skills;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/auth/register                 register (public)
/// /users/auth/login                    login (public)
/// /users/auth/refresh                  refresh (auth)
/// /users/auth/logout                   logout (auth)
/// /users/auth/me                       current user (auth)
///
/// /academic-sessions                   list, create (admin)
/// /academic-sessions/active            resolved active session
/// /academic-sessions/{id}              get, update, delete (admin)
/// /academic-sessions/{id}/start        start (admin)
/// /academic-sessions/{id}/end          end (admin)
///
/// /skills                              list, create (admin)
/// /skills/{id}                         get, update, delete (admin)
/// /skills/{skill_id}/groups            list, create (admin)
///
/// /groups/{id}                         get, update, delete (admin)
/// /groups/{id}/statistics              capacity and scan totals
/// /groups/{id}/members                 seated students (mentor/admin)
/// /groups/{id}/attendance-report       report (mentor/admin)
/// /groups/{id}/requirements            get, put (mentor/admin)
///
/// /enrollments                         list (admin), select skill (student)
/// /enrollments/me                      own enrollment (student)
/// /enrollments/{id}/pay                pay (student owner)
/// /enrollments/{id}/assign             assign group (admin)
/// /enrollments/{id}/complete           complete (admin)
///
/// /qr/generate                         issue (mentor/admin)
/// /qr/generate-bulk                    bulk issue (mentor/admin)
/// /qr/tokens                           list by group (mentor/admin)
/// /qr/tokens/{id}/revoke               revoke (mentor/admin)
///
/// /scans                               submit (student)
/// /scans/history                       own history (student)
/// /attendance/me                       daily record (student)
///
/// /dashboard/admin                     admin dashboard
/// /dashboard/mentor                    mentor dashboard
/// /dashboard/student                   student dashboard
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users/auth", auth::router())
        .nest("/academic-sessions", academic_sessions::router())
        .nest("/skills", skills::router())
        .nest("/groups", groups::router())
        .nest("/enrollments", enrollments::router())
        .nest("/qr", qr::router())
        .nest("/scans", scans::router())
        .nest("/attendance", scans::attendance_router())
        .nest("/dashboard", dashboard::router())
}
