//! Handlers for the `/skills` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use vocatrack_core::error::CoreError;
use vocatrack_core::types::DbId;
use vocatrack_db::models::skill::{CreateSkill, Skill, UpdateSkill};
use vocatrack_db::repositories::{AcademicSessionRepo, SkillRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_TITLE_LENGTH: usize = 200;

/// Query parameters for `GET /skills`.
#[derive(Debug, Deserialize)]
pub struct SkillListParams {
    pub academic_session_id: Option<DbId>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Skill", id })
}

fn validate_title(title: &str) -> Result<(), AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_TITLE_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "title must be 1 to {MAX_TITLE_LENGTH} characters"
        ))));
    }
    Ok(())
}

fn validate_price(price_minor: Option<i64>) -> Result<(), AppError> {
    match price_minor {
        Some(p) if p < 0 => Err(AppError::Core(CoreError::Validation(
            "price_minor must not be negative".into(),
        ))),
        _ => Ok(()),
    }
}

/// POST /api/v1/skills
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateSkill>,
) -> AppResult<(StatusCode, Json<DataResponse<Skill>>)> {
    validate_title(&input.title)?;
    validate_price(input.price_minor)?;
    AcademicSessionRepo::find_by_id(&state.pool, input.academic_session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AcademicSession",
            id: input.academic_session_id,
        }))?;

    let skill = SkillRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: skill })))
}

/// GET /api/v1/skills
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<SkillListParams>,
) -> AppResult<Json<DataResponse<Vec<Skill>>>> {
    let skills = SkillRepo::list(&state.pool, params.academic_session_id).await?;
    Ok(Json(DataResponse { data: skills }))
}

/// GET /api/v1/skills/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Skill>>> {
    let skill = SkillRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: skill }))
}

/// PUT /api/v1/skills/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSkill>,
) -> AppResult<Json<DataResponse<Skill>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    validate_price(input.price_minor)?;

    let skill = SkillRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: skill }))
}

/// DELETE /api/v1/skills/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SkillRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
