//! Route definitions for the `/users/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/users/auth`.
///
/// ```text
/// POST /register -> register (public, creates a student)
/// POST /login    -> login (public)
/// POST /refresh  -> refresh (requires auth)
/// POST /logout   -> logout (requires auth)
/// GET  /me       -> current user (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}
