//! Role-based access control extractors.
//!
//! Each extractor authenticates through [`AuthUser`] and answers 403 when the
//! caller's role is not allowed. Group-level checks (a mentor may only manage
//! groups they lead) happen in the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use vocatrack_core::error::CoreError;
use vocatrack_core::roles::{is_admin, is_staff, ROLE_STUDENT};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticate, then apply `allowed` to the role.
async fn require(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&str) -> bool,
    denied: &'static str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed(&user.role) {
        tracing::debug!(user_id = user.user_id, role = %user.role, denied, "Role check failed");
        return Err(AppError::Core(CoreError::Forbidden(denied.into())));
    }
    Ok(user)
}

fn is_student(role: &str) -> bool {
    role == ROLE_STUDENT
}

/// `admin` or `superadmin`: sessions, skills, groups, enrollment assignment.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, is_admin, "Admin role required")
            .await
            .map(Self)
    }
}

/// Any staff role: QR issuance, reports, requirements, the mentor dashboard.
pub struct RequireMentor(pub AuthUser);

impl FromRequestParts<AppState> for RequireMentor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, is_staff, "Mentor or Admin role required")
            .await
            .map(Self)
    }
}

/// `student` only: enrollment, scanning, own attendance.
pub struct RequireStudent(pub AuthUser);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, is_student, "Student role required")
            .await
            .map(Self)
    }
}

/// Any signed-in user.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state).await.map(Self)
    }
}
