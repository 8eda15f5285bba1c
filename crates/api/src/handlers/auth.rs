//! Handlers for the `/users/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use vocatrack_core::error::CoreError;
use vocatrack_core::roles::ROLE_STUDENT;
use vocatrack_db::models::user::{CreateUser, User, UserResponse};
use vocatrack_db::repositories::{RoleRepo, UserRepo};

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failures before a temporary lock.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

/// Request body for `POST /users/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub matric_number: Option<String>,
}

/// Request body for `POST /users/auth/login`. `username` may also be an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// POST /api/v1/users/auth/register
///
/// Self-service registration. New accounts always get the `student` role.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let username = input.username.trim();
    let email = input.email.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "username must not be empty".into(),
        )));
    }
    if !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "email must be a valid address".into(),
        )));
    }
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "first_name and last_name are required".into(),
        )));
    }
    validate_password_strength(&input.password, state.config.password_min_length)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = RoleRepo::find_by_name(&state.pool, ROLE_STUDENT)
        .await?
        .ok_or_else(|| AppError::InternalError("student role is not seeded".into()))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            email,
            password_hash,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            matric_number: input
                .matric_number
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Student registered");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: user.to_response(role.name),
        }),
    ))
}

/// POST /api/v1/users/auth/login
///
/// Authenticate with username (or email) and password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid username or password".into()));

    let user = UserRepo::find_by_login(&state.pool, input.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        let locked = UserRepo::record_failed_login(
            &state.pool,
            user.id,
            MAX_FAILED_ATTEMPTS,
            LOCK_DURATION_MINS,
        )
        .await?;
        if let Some(until) = locked {
            tracing::warn!(user_id = user.id, %until, "Account locked after failed logins");
        }
        return Err(invalid());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let lifetime = state.config.jwt.login_lifetime_secs();
    let response = auth_response(&state, &user, lifetime).await?;
    tracing::info!(user_id = user.id, role = %response.user.role, "User logged in");

    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/users/auth/refresh
///
/// Exchange a still-valid session token for a fresh one.
pub async fn refresh(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let user = active_user(&state, &auth_user).await?;
    let lifetime = state.config.jwt.refresh_lifetime_secs();
    let response = auth_response(&state, &user, lifetime).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/users/auth/logout
///
/// Session tokens are stateless; the gateway clears the cookie. Returns 204.
pub async fn logout(auth_user: AuthUser) -> StatusCode {
    tracing::info!(user_id = auth_user.user_id, "User logged out");
    StatusCode::NO_CONTENT
}

/// GET /api/v1/users/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = active_user(&state, &auth_user).await?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(DataResponse {
        data: user.to_response(role),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reload the token's user, rejecting deleted or deactivated accounts.
async fn active_user(state: &AppState, auth_user: &AuthUser) -> AppResult<User> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    Ok(user)
}

/// Sign a token with the user's current role and build the response.
async fn auth_response(state: &AppState, user: &User, lifetime_secs: i64) -> AppResult<AuthResponse> {
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;

    let access_token = generate_token(user.id, &role, lifetime_secs, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: lifetime_secs,
        user: user.to_response(role),
    })
}
