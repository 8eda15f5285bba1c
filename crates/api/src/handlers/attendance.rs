//! Handler for the student's daily attendance record.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use vocatrack_core::attendance::{derive_record, resolve_required_count, scan_date, AttendanceRecord};
use vocatrack_core::types::DbId;
use vocatrack_db::repositories::{EnrollmentRepo, RequirementRepo, ScanEventRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireStudent;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /attendance/me`.
#[derive(Debug, Deserialize)]
pub struct AttendanceParams {
    /// UTC date; defaults to today.
    pub date: Option<NaiveDate>,
}

/// Derive a student's record for one group and date from stored scans.
pub(crate) async fn record_for(
    state: &AppState,
    student_id: DbId,
    group_id: DbId,
    date: NaiveDate,
) -> AppResult<AttendanceRecord> {
    let accepted = ScanEventRepo::count_for_date(&state.pool, student_id, group_id, date).await?;
    let configured = RequirementRepo::find_for_date(&state.pool, group_id, date)
        .await?
        .map(|r| r.required_count);
    let required =
        resolve_required_count(configured, state.config.attendance.default_required_scans);
    Ok(derive_record(student_id, group_id, date, accepted, required))
}

/// GET /api/v1/attendance/me?date=
///
/// `data` is `null` while the student has no group.
pub async fn me(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Query(params): Query<AttendanceParams>,
) -> AppResult<Json<DataResponse<Option<AttendanceRecord>>>> {
    let date = params.date.unwrap_or_else(|| scan_date(Utc::now()));
    let group_id = EnrollmentRepo::find_open_for_student(&state.pool, student.user_id)
        .await?
        .and_then(|e| e.group_id);

    let record = match group_id {
        Some(group_id) => Some(record_for(&state, student.user_id, group_id, date).await?),
        None => None,
    };
    Ok(Json(DataResponse { data: record }))
}
