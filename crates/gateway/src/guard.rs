//! Page guard for protected front-end paths.
//!
//! Runs in front of the static file service. For paths under a protected
//! prefix the session cookie is validated against `{upstream}/v1/users/auth/me`
//! and the caller's role decides whether the page is served.

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use vocatrack_core::route_access::{decide, protected_prefix, PageDecision};

use crate::cookie::{clear_session_cookie, read_session};
use crate::state::GatewayState;

pub const ME_PATH: &str = "v1/users/auth/me";

#[derive(Debug, Deserialize)]
struct MeEnvelope {
    data: MeUser,
}

#[derive(Debug, Deserialize)]
struct MeUser {
    role: String,
}

/// Outcome of checking a session against the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    /// No cookie was sent.
    Anonymous,
    /// The API confirmed the session and reported this role.
    Valid { role: String },
    /// The API rejected the token.
    Rejected,
    /// The API could not be asked.
    Unavailable,
}

impl SessionCheck {
    pub fn role(&self) -> Option<&str> {
        match self {
            Self::Valid { role } => Some(role),
            _ => None,
        }
    }
}

/// Ask the API who owns `token`.
pub async fn check_session(state: &GatewayState, token: &str) -> SessionCheck {
    let Ok(url) = state.upstream(ME_PATH) else {
        return SessionCheck::Unavailable;
    };
    let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {token}")) else {
        return SessionCheck::Rejected;
    };

    let response = match state.http.get(&url).header(AUTHORIZATION, bearer).send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "Session check failed");
            return SessionCheck::Unavailable;
        }
    };

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return SessionCheck::Rejected;
    }
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "Session check returned an error");
        return SessionCheck::Unavailable;
    }

    match response.json::<MeEnvelope>().await {
        Ok(me) => SessionCheck::Valid { role: me.data.role },
        Err(err) => {
            tracing::warn!(error = %err, "Session check returned an unexpected body");
            SessionCheck::Unavailable
        }
    }
}

/// Middleware applied to page requests.
pub async fn page_guard(State(state): State<GatewayState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if protected_prefix(&path).is_none() {
        return next.run(request).await;
    }

    let check = match read_session(request.headers()) {
        Some(token) => check_session(&state, &token).await,
        None => SessionCheck::Anonymous,
    };

    match decide(&path, check.role()) {
        PageDecision::Allow => next.run(request).await,
        PageDecision::RedirectToSignIn { location } => {
            tracing::debug!(path = %path, "Redirecting to sign-in");
            let mut response = Redirect::temporary(&location).into_response();
            if check == SessionCheck::Rejected {
                response.headers_mut().append(
                    SET_COOKIE,
                    clear_session_cookie(state.config.is_production()),
                );
            }
            response
        }
        PageDecision::RedirectHome => {
            tracing::info!(path = %path, role = check.role(), "Role not allowed on page");
            Redirect::temporary("/").into_response()
        }
    }
}
