//! `GET /auth/callback`: land an externally issued session token in the
//! session cookie and continue to the requested page.

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::cookie::{session_cookie, SameSite, LOGIN_DEFAULT_MAX_AGE_SECS};
use crate::error::GatewayError;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub token: Option<String>,
    pub expires_in: Option<i64>,
    pub redirect: Option<String>,
}

/// Only same-origin absolute paths are followed; anything else goes home.
pub fn safe_redirect(target: Option<&str>) -> &str {
    match target {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path
        }
        _ => "/",
    }
}

pub async fn callback(
    State(state): State<GatewayState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, GatewayError> {
    let token = params
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GatewayError::BadRequest("token is required".into()))?;

    let max_age = params
        .expires_in
        .filter(|secs| *secs > 0)
        .unwrap_or(LOGIN_DEFAULT_MAX_AGE_SECS);
    let cookie = session_cookie(token, max_age, SameSite::Lax, state.config.is_production())
        .ok_or_else(|| GatewayError::BadRequest("token is malformed".into()))?;

    let location = safe_redirect(params.redirect.as_deref());
    tracing::info!(redirect = location, "Session established from callback");

    let mut response = Redirect::to(location).into_response();
    response.headers_mut().append(SET_COOKIE, cookie);
    Ok(response)
}
