//! Read-only dashboards for admins, mentors, and students.
//!
//! Each handler loads raw rows concurrently and hands them to the composers
//! in `vocatrack_core::dashboard`.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use futures::future::try_join_all;
use vocatrack_core::attendance::scan_date;
use vocatrack_core::dashboard::{
    compose_admin, compose_mentor, compose_student, AdminDashboard, MentorDashboard,
    MentorGroupInput, StudentDashboard,
};
use vocatrack_core::enrollment::ScanEligibility;
use vocatrack_core::roles::is_admin;
use vocatrack_db::models::academic_session::AcademicSession;
use vocatrack_db::models::group::GroupWithCapacity;
use vocatrack_db::repositories::{
    AcademicSessionRepo, EnrollmentRepo, GroupRepo, ScanEventRepo, SkillRepo,
};

use super::attendance::record_for;
use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireMentor, RequireStudent};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/admin
pub async fn admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<AdminDashboard>>> {
    let now = Utc::now();
    let pool = &state.pool;

    let (sessions, total_skills, groups, status_counts, scans_today) = futures::try_join!(
        AcademicSessionRepo::list(pool),
        SkillRepo::count(pool),
        GroupRepo::list_all(pool),
        EnrollmentRepo::status_counts(pool),
        ScanEventRepo::count_all_on(pool, scan_date(now)),
    )?;

    let windows: Vec<_> = sessions.iter().map(AcademicSession::window).collect();
    let capacities: Vec<_> = groups.iter().map(GroupWithCapacity::capacity).collect();
    let counts: Vec<(String, i64)> = status_counts
        .into_iter()
        .map(|c| (c.status, c.count))
        .collect();

    let dashboard = compose_admin(&windows, total_skills, &capacities, &counts, scans_today, now);
    Ok(Json(DataResponse { data: dashboard }))
}

/// GET /api/v1/dashboard/mentor
///
/// Mentors see the groups they lead; admins see every group.
pub async fn mentor(
    State(state): State<AppState>,
    RequireMentor(user): RequireMentor,
) -> AppResult<Json<DataResponse<MentorDashboard>>> {
    let now = Utc::now();
    let today = scan_date(now);
    let pool = &state.pool;
    let default_required = state.config.attendance.default_required_scans;

    let sessions = AcademicSessionRepo::list(pool).await?;
    let groups = if is_admin(&user.role) {
        GroupRepo::list_all(pool).await?
    } else {
        GroupRepo::list_for_mentor(pool, user.user_id).await?
    };

    let inputs = try_join_all(groups.into_iter().map(|g| async move {
        let id = g.group.id;
        let (totals, complete) = futures::try_join!(
            GroupRepo::scan_totals(pool, id, today),
            GroupRepo::students_complete_on(pool, id, today, default_required),
        )?;
        Ok::<_, sqlx::Error>(MentorGroupInput {
            group_id: id,
            group_number: g.group.group_number,
            capacity: g.capacity(),
            skill_title: g.skill_title,
            scans_today: totals.scans_today,
            students_complete_today: complete,
            active_tokens: totals.active_tokens,
        })
    }))
    .await?;

    let windows: Vec<_> = sessions.iter().map(AcademicSession::window).collect();
    Ok(Json(DataResponse {
        data: compose_mentor(&windows, inputs, now),
    }))
}

/// GET /api/v1/dashboard/student
pub async fn student(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
) -> AppResult<Json<DataResponse<StudentDashboard>>> {
    let now = Utc::now();
    let pool = &state.pool;

    let (sessions, enrollment, (total_scans, total_points)) = futures::try_join!(
        AcademicSessionRepo::list(pool),
        EnrollmentRepo::find_open_for_student(pool, student.user_id),
        ScanEventRepo::totals_for_student(pool, student.user_id),
    )?;

    let eligibility = ScanEligibility::evaluate(enrollment.as_ref().map(|e| e.view()).as_ref());
    let today = match &eligibility {
        ScanEligibility::Eligible { group_id } => {
            Some(record_for(&state, student.user_id, *group_id, scan_date(now)).await?)
        }
        _ => None,
    };

    let windows: Vec<_> = sessions.iter().map(AcademicSession::window).collect();
    Ok(Json(DataResponse {
        data: compose_student(&windows, eligibility, today, total_scans, total_points, now),
    }))
}
