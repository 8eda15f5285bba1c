//! Repository for the `attendance_requirements` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use vocatrack_core::types::DbId;

use crate::models::requirement::AttendanceRequirement;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, group_id, date, required_count, created_at, updated_at";

pub struct RequirementRepo;

impl RequirementRepo {
    /// Set the required count for (group, date), replacing any previous value.
    pub async fn upsert(
        pool: &PgPool,
        group_id: DbId,
        date: NaiveDate,
        required_count: i32,
    ) -> Result<AttendanceRequirement, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_requirements (group_id, date, required_count)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_attendance_requirements_group_date DO UPDATE
             SET required_count = EXCLUDED.required_count
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRequirement>(&query)
            .bind(group_id)
            .bind(date)
            .bind(required_count)
            .fetch_one(pool)
            .await
    }

    pub async fn find_for_date(
        pool: &PgPool,
        group_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRequirement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_requirements WHERE group_id = $1 AND date = $2"
        );
        sqlx::query_as::<_, AttendanceRequirement>(&query)
            .bind(group_id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// Every explicit requirement for a group, by date.
    pub async fn list_for_group(
        pool: &PgPool,
        group_id: DbId,
    ) -> Result<Vec<AttendanceRequirement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_requirements WHERE group_id = $1 ORDER BY date ASC"
        );
        sqlx::query_as::<_, AttendanceRequirement>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }
}
