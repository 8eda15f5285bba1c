//! Handlers for skill groups: CRUD, capacity statistics, members, the
//! attendance report, and daily attendance requirements.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use vocatrack_core::attendance::{scan_date, validate_required_count};
use vocatrack_core::capacity::validate_capacity;
use vocatrack_core::error::CoreError;
use vocatrack_core::report::AttendanceReport;
use vocatrack_core::roles::{is_admin, is_staff};
use vocatrack_core::types::DbId;
use vocatrack_db::models::group::{
    CreateGroup, GroupMember, GroupResponse, GroupStatistics, GroupWithCapacity, UpdateGroup,
};
use vocatrack_db::models::requirement::{AttendanceRequirement, SetRequirement};
use vocatrack_db::repositories::{
    GroupRepo, ReportRepo, RequirementRepo, RoleRepo, SkillRepo, UserRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireMentor};
use crate::response::DataResponse;
use crate::state::AppState;

/// `GET /groups/{id}/requirements` payload.
#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
    pub group_id: DbId,
    /// Applies to every date without an explicit row.
    pub default_required_count: i32,
    pub requirements: Vec<AttendanceRequirement>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Group", id })
}

// ---------------------------------------------------------------------------
// Access helpers
// ---------------------------------------------------------------------------

/// Load a group the caller may manage: admins see every group, mentors only
/// the groups they lead.
pub(crate) async fn load_managed_group(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<GroupWithCapacity> {
    let group = GroupRepo::with_capacity(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !is_admin(&user.role) && group.group.mentor_id != Some(user.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not lead this group".into(),
        )));
    }
    Ok(group)
}

/// A mentor assignment must name an existing staff account.
async fn ensure_mentor(state: &AppState, mentor_id: Option<DbId>) -> AppResult<()> {
    let Some(mentor_id) = mentor_id else {
        return Ok(());
    };
    let user = UserRepo::find_by_id(&state.pool, mentor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: mentor_id,
        }))?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    if !is_staff(&role) {
        return Err(AppError::Core(CoreError::Validation(
            "mentor_id must reference a mentor or admin account".into(),
        )));
    }
    Ok(())
}

fn validate_group_number(number: i32) -> Result<(), AppError> {
    if number < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "group_number must be at least 1".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/skills/{skill_id}/groups
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(skill_id): Path<DbId>,
    Json(input): Json<CreateGroup>,
) -> AppResult<(StatusCode, Json<DataResponse<GroupResponse>>)> {
    validate_group_number(input.group_number)?;
    validate_capacity(input.max_student_capacity)
        .map_err(|m| AppError::Core(CoreError::Validation(m)))?;
    SkillRepo::find_by_id(&state.pool, skill_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Skill",
            id: skill_id,
        }))?;
    ensure_mentor(&state, input.mentor_id).await?;

    let group = GroupRepo::create(&state.pool, skill_id, &input).await?;
    let view = GroupRepo::with_capacity(&state.pool, group.id)
        .await?
        .ok_or_else(|| not_found(group.id))?;
    tracing::info!(group_id = group.id, skill_id, "Group created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: view.into() }),
    ))
}

/// GET /api/v1/skills/{skill_id}/groups
pub async fn list_for_skill(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(skill_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<GroupResponse>>>> {
    let groups = GroupRepo::list_for_skill(&state.pool, skill_id).await?;
    Ok(Json(DataResponse {
        data: groups.into_iter().map(GroupResponse::from).collect(),
    }))
}

/// GET /api/v1/groups/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GroupResponse>>> {
    let group = GroupRepo::with_capacity(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: group.into() }))
}

/// PUT /api/v1/groups/{id}
///
/// Capacity cannot drop below the number of seated students.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateGroup>,
) -> AppResult<Json<DataResponse<GroupResponse>>> {
    let existing = GroupRepo::with_capacity(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(number) = input.group_number {
        validate_group_number(number)?;
    }
    if let Some(max) = input.max_student_capacity {
        validate_capacity(max).map_err(|m| AppError::Core(CoreError::Validation(m)))?;
        if i64::from(max) < existing.current_member_count {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Group already seats {} students",
                existing.current_member_count
            ))));
        }
    }
    ensure_mentor(&state, input.mentor_id).await?;

    GroupRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    let view = GroupRepo::with_capacity(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: view.into() }))
}

/// DELETE /api/v1/groups/{id}
///
/// Fails with 409 while enrollments still reference the group.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if GroupRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Read views
// ---------------------------------------------------------------------------

/// GET /api/v1/groups/{id}/statistics
pub async fn statistics(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GroupStatistics>>> {
    let stats = GroupRepo::statistics(&state.pool, id, scan_date(Utc::now()))
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/groups/{id}/members
pub async fn members(
    State(state): State<AppState>,
    RequireMentor(user): RequireMentor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<GroupMember>>>> {
    load_managed_group(&state, &user, id).await?;
    let members = GroupRepo::list_members(&state.pool, id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// GET /api/v1/groups/{id}/attendance-report
///
/// Computed from stored scan events on every request.
pub async fn attendance_report(
    State(state): State<AppState>,
    RequireMentor(user): RequireMentor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AttendanceReport>>> {
    load_managed_group(&state, &user, id).await?;
    let report = ReportRepo::group_report(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// GET /api/v1/groups/{id}/requirements
pub async fn requirements(
    State(state): State<AppState>,
    RequireMentor(user): RequireMentor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RequirementsResponse>>> {
    load_managed_group(&state, &user, id).await?;
    let requirements = RequirementRepo::list_for_group(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: RequirementsResponse {
            group_id: id,
            default_required_count: state.config.attendance.default_required_scans,
            requirements,
        },
    }))
}

/// PUT /api/v1/groups/{id}/requirements
///
/// Sets the required scan count for one date, replacing any earlier value.
pub async fn set_requirement(
    State(state): State<AppState>,
    RequireMentor(user): RequireMentor,
    Path(id): Path<DbId>,
    Json(input): Json<SetRequirement>,
) -> AppResult<Json<DataResponse<AttendanceRequirement>>> {
    validate_required_count(input.required_count)
        .map_err(|m| AppError::Core(CoreError::Validation(m)))?;
    load_managed_group(&state, &user, id).await?;

    let requirement =
        RequirementRepo::upsert(&state.pool, id, input.date, input.required_count).await?;
    tracing::info!(
        group_id = id,
        date = %input.date,
        required_count = input.required_count,
        "Attendance requirement set"
    );
    Ok(Json(DataResponse { data: requirement }))
}
