//! Handlers for the `/academic-sessions` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use vocatrack_core::academic_session::{
    resolve_active_session, validate_session_name, validate_session_window,
};
use vocatrack_core::error::CoreError;
use vocatrack_core::types::DbId;
use vocatrack_db::models::academic_session::{
    AcademicSession, CreateAcademicSession, UpdateAcademicSession,
};
use vocatrack_db::repositories::AcademicSessionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "AcademicSession",
        id,
    })
}

/// POST /api/v1/academic-sessions
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateAcademicSession>,
) -> AppResult<(StatusCode, Json<DataResponse<AcademicSession>>)> {
    validate_session_name(&input.name).map_err(|m| AppError::Core(CoreError::Validation(m)))?;
    validate_session_window(input.starts_at, input.ends_at)
        .map_err(|m| AppError::Core(CoreError::Validation(m)))?;

    let session = AcademicSessionRepo::create(&state.pool, &input).await?;
    tracing::info!(session_id = session.id, user_id = admin.user_id, "Academic session created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /api/v1/academic-sessions
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<AcademicSession>>>> {
    let sessions = AcademicSessionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// GET /api/v1/academic-sessions/active
///
/// The flagged session, or else the one whose window contains now.
/// `data` is `null` when neither exists.
pub async fn active(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<DataResponse<Option<AcademicSession>>>> {
    let sessions = AcademicSessionRepo::list(&state.pool).await?;
    let windows: Vec<_> = sessions.iter().map(AcademicSession::window).collect();
    let resolved = resolve_active_session(&windows, Utc::now())
        .and_then(|id| sessions.into_iter().find(|s| s.id == id));
    Ok(Json(DataResponse { data: resolved }))
}

/// GET /api/v1/academic-sessions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AcademicSession>>> {
    let session = AcademicSessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: session }))
}

/// PUT /api/v1/academic-sessions/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAcademicSession>,
) -> AppResult<Json<DataResponse<AcademicSession>>> {
    let existing = AcademicSessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(name) = &input.name {
        validate_session_name(name).map_err(|m| AppError::Core(CoreError::Validation(m)))?;
    }
    validate_session_window(
        input.starts_at.unwrap_or(existing.starts_at),
        input.ends_at.unwrap_or(existing.ends_at),
    )
    .map_err(|m| AppError::Core(CoreError::Validation(m)))?;

    let session = AcademicSessionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: session }))
}

/// DELETE /api/v1/academic-sessions/{id}
///
/// The active session cannot be deleted; end it first.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = AcademicSessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if existing.active {
        return Err(AppError::Core(CoreError::Conflict(
            "End the session before deleting it".into(),
        )));
    }

    if AcademicSessionRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/academic-sessions/{id}/start
///
/// Makes this session the only active one in a single transaction.
pub async fn start(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AcademicSession>>> {
    let session = AcademicSessionRepo::start(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(session_id = id, user_id = admin.user_id, "Academic session started");
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/academic-sessions/{id}/end
pub async fn end(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AcademicSession>>> {
    let session = AcademicSessionRepo::end(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(session_id = id, user_id = admin.user_id, "Academic session ended");
    Ok(Json(DataResponse { data: session }))
}
