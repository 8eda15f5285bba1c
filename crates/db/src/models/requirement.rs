//! Attendance requirement entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vocatrack_core::types::{DbId, Timestamp};

/// A row from the `attendance_requirements` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttendanceRequirement {
    pub id: DbId,
    pub group_id: DbId,
    pub date: NaiveDate,
    pub required_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `PUT /groups/{id}/requirements`.
#[derive(Debug, Deserialize)]
pub struct SetRequirement {
    pub date: NaiveDate,
    pub required_count: i32,
}
