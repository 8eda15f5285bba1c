//! Handlers for the `/enrollments` resource.
//!
//! Lifecycle: a student selects a skill, pays, is assigned to a group by an
//! admin, becomes active on the first accepted scan, and is completed by an
//! admin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use vocatrack_core::enrollment::{
    ensure_no_open_enrollment, validate_payment_reference, EnrollmentStatus, ScanEligibility,
};
use vocatrack_core::error::CoreError;
use vocatrack_core::types::DbId;
use vocatrack_db::models::enrollment::{
    AssignEnrollment, CreateEnrollment, Enrollment, PayEnrollment,
};
use vocatrack_db::repositories::{AssignOutcome, EnrollmentRepo, SkillRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStudent};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /enrollments`.
#[derive(Debug, Deserialize)]
pub struct EnrollmentListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /enrollments/me` payload.
#[derive(Debug, Serialize)]
pub struct MyEnrollment {
    pub enrollment: Option<Enrollment>,
    pub eligibility: ScanEligibility,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Enrollment",
        id,
    })
}

/// GET /api/v1/enrollments
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<EnrollmentListParams>,
) -> AppResult<Json<DataResponse<Vec<Enrollment>>>> {
    if let Some(status) = &params.status {
        EnrollmentStatus::from_str_value(status)
            .map_err(|m| AppError::Core(CoreError::Validation(m)))?;
    }
    let page = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let enrollments = EnrollmentRepo::list(
        &state.pool,
        params.status.as_deref(),
        page.limit(),
        page.offset(),
    )
    .await?;
    Ok(Json(DataResponse { data: enrollments }))
}

/// POST /api/v1/enrollments
///
/// Select a skill. A student holds at most one open enrollment.
pub async fn create(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Json(input): Json<CreateEnrollment>,
) -> AppResult<(StatusCode, Json<DataResponse<Enrollment>>)> {
    let skill = SkillRepo::find_by_id(&state.pool, input.skill_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Skill",
            id: input.skill_id,
        }))?;
    if !skill.is_active {
        return Err(AppError::Core(CoreError::Validation(
            "Skill is not open for enrollment".into(),
        )));
    }

    let existing = EnrollmentRepo::find_open_for_student(&state.pool, student.user_id).await?;
    ensure_no_open_enrollment(existing.and_then(|e| e.status().ok()))
        .map_err(|m| AppError::Core(CoreError::Conflict(m)))?;

    let enrollment = EnrollmentRepo::create(&state.pool, student.user_id, skill.id).await?;
    tracing::info!(
        enrollment_id = enrollment.id,
        student_id = student.user_id,
        skill_id = skill.id,
        "Skill selected"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: enrollment })))
}

/// GET /api/v1/enrollments/me
///
/// The caller's open enrollment and whether the scan page may be used.
pub async fn me(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
) -> AppResult<Json<DataResponse<MyEnrollment>>> {
    let enrollment = EnrollmentRepo::find_open_for_student(&state.pool, student.user_id).await?;
    let eligibility = ScanEligibility::evaluate(enrollment.as_ref().map(|e| e.view()).as_ref());
    Ok(Json(DataResponse {
        data: MyEnrollment {
            enrollment,
            eligibility,
        },
    }))
}

/// POST /api/v1/enrollments/{id}/pay
pub async fn pay(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path(id): Path<DbId>,
    Json(input): Json<PayEnrollment>,
) -> AppResult<Json<DataResponse<Enrollment>>> {
    validate_payment_reference(&input.payment_reference)
        .map_err(|m| AppError::Core(CoreError::Validation(m)))?;

    if let Some(paid) = EnrollmentRepo::mark_paid(
        &state.pool,
        id,
        student.user_id,
        &input.payment_reference,
        Utc::now(),
    )
    .await?
    {
        tracing::info!(enrollment_id = id, student_id = student.user_id, "Enrollment paid");
        return Ok(Json(DataResponse { data: paid }));
    }

    // Someone else's enrollment is reported as missing.
    match EnrollmentRepo::find_by_id(&state.pool, id).await? {
        Some(e) if e.student_id == student.user_id => Err(AppError::Core(CoreError::Conflict(
            format!("Enrollment is '{}', only 'selected' enrollments can be paid", e.status),
        ))),
        _ => Err(not_found(id)),
    }
}

/// POST /api/v1/enrollments/{id}/assign
pub async fn assign(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignEnrollment>,
) -> AppResult<Json<DataResponse<Enrollment>>> {
    let outcome = EnrollmentRepo::assign_to_group(&state.pool, id, input.group_id, Utc::now()).await?;
    match outcome {
        AssignOutcome::Assigned(enrollment) => Ok(Json(DataResponse { data: enrollment })),
        AssignOutcome::EnrollmentNotFound => Err(not_found(id)),
        AssignOutcome::GroupNotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Group",
            id: input.group_id,
        })),
        AssignOutcome::SkillMismatch => Err(AppError::Core(CoreError::Validation(
            "Group belongs to a different skill".into(),
        ))),
        AssignOutcome::InvalidStatus(msg) => Err(AppError::Core(CoreError::Conflict(msg))),
        AssignOutcome::GroupFull(capacity) => Err(AppError::Core(CoreError::Conflict(format!(
            "Group is full ({} of {} seats taken)",
            capacity.current_member_count, capacity.max_student_capacity
        )))),
    }
}

/// POST /api/v1/enrollments/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Enrollment>>> {
    if let Some(done) = EnrollmentRepo::complete(&state.pool, id, Utc::now()).await? {
        tracing::info!(enrollment_id = id, "Enrollment completed");
        return Ok(Json(DataResponse { data: done }));
    }

    let existing = EnrollmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Err(AppError::Core(CoreError::Conflict(format!(
        "Enrollment is '{}', only 'active' enrollments can be completed",
        existing.status
    ))))
}
