//! Repository for the `skill_groups` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use vocatrack_core::types::DbId;

use crate::models::group::{
    CreateGroup, GroupMember, GroupScanTotals, GroupStatistics, GroupWithCapacity, SkillGroup,
    UpdateGroup,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, skill_id, group_number, mentor_id, practical_date, \
                       max_student_capacity, location, created_at, updated_at";

/// Enrollment statuses that occupy a seat in a group.
pub(crate) const SEATED_STATUSES: &str = "('assigned', 'active')";

/// Select list for [`GroupWithCapacity`]; expects `g` = skill_groups, `s` = skills.
fn capacity_select() -> String {
    format!(
        "SELECT g.id, g.skill_id, g.group_number, g.mentor_id, g.practical_date,
                g.max_student_capacity, g.location, g.created_at, g.updated_at,
                s.title AS skill_title,
                (SELECT COUNT(*) FROM enrollments e
                  WHERE e.group_id = g.id AND e.status IN {SEATED_STATUSES}) AS current_member_count
         FROM skill_groups g
         JOIN skills s ON s.id = g.skill_id"
    )
}

/// Provides CRUD, capacity, and roster operations for skill groups.
pub struct GroupRepo;

impl GroupRepo {
    pub async fn create(
        pool: &PgPool,
        skill_id: DbId,
        input: &CreateGroup,
    ) -> Result<SkillGroup, sqlx::Error> {
        let query = format!(
            "INSERT INTO skill_groups
                (skill_id, group_number, mentor_id, practical_date, max_student_capacity, location)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SkillGroup>(&query)
            .bind(skill_id)
            .bind(input.group_number)
            .bind(input.mentor_id)
            .bind(input.practical_date)
            .bind(input.max_student_capacity)
            .bind(&input.location)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SkillGroup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skill_groups WHERE id = $1");
        sqlx::query_as::<_, SkillGroup>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A group with its skill title and live member count.
    pub async fn with_capacity(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<GroupWithCapacity>, sqlx::Error> {
        let query = format!("{} WHERE g.id = $1", capacity_select());
        sqlx::query_as::<_, GroupWithCapacity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_skill(
        pool: &PgPool,
        skill_id: DbId,
    ) -> Result<Vec<GroupWithCapacity>, sqlx::Error> {
        let query = format!(
            "{} WHERE g.skill_id = $1 ORDER BY g.group_number ASC",
            capacity_select()
        );
        sqlx::query_as::<_, GroupWithCapacity>(&query)
            .bind(skill_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_mentor(
        pool: &PgPool,
        mentor_id: DbId,
    ) -> Result<Vec<GroupWithCapacity>, sqlx::Error> {
        let query = format!(
            "{} WHERE g.mentor_id = $1 ORDER BY s.title ASC, g.group_number ASC",
            capacity_select()
        );
        sqlx::query_as::<_, GroupWithCapacity>(&query)
            .bind(mentor_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<GroupWithCapacity>, sqlx::Error> {
        let query = format!("{} ORDER BY s.title ASC, g.group_number ASC", capacity_select());
        sqlx::query_as::<_, GroupWithCapacity>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGroup,
    ) -> Result<Option<SkillGroup>, sqlx::Error> {
        let query = format!(
            "UPDATE skill_groups SET
                group_number = COALESCE($2, group_number),
                mentor_id = COALESCE($3, mentor_id),
                practical_date = COALESCE($4, practical_date),
                max_student_capacity = COALESCE($5, max_student_capacity),
                location = COALESCE($6, location)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SkillGroup>(&query)
            .bind(id)
            .bind(input.group_number)
            .bind(input.mentor_id)
            .bind(input.practical_date)
            .bind(input.max_student_capacity)
            .bind(&input.location)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM skill_groups WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Scan and token totals for one group, with `today` as the UTC date.
    pub async fn scan_totals(
        pool: &PgPool,
        id: DbId,
        today: NaiveDate,
    ) -> Result<GroupScanTotals, sqlx::Error> {
        sqlx::query_as::<_, GroupScanTotals>(
            "SELECT
                (SELECT COUNT(*) FROM scan_events WHERE group_id = $1) AS total_scans,
                (SELECT COALESCE(SUM(points_awarded), 0)::BIGINT
                   FROM scan_events WHERE group_id = $1) AS total_points,
                (SELECT COUNT(*) FROM scan_events
                  WHERE group_id = $1 AND scan_date = $2) AS scans_today,
                (SELECT COUNT(*) FROM qr_tokens
                  WHERE group_id = $1 AND revoked_at IS NULL AND expires_at > NOW()) AS active_tokens",
        )
        .bind(id)
        .bind(today)
        .fetch_one(pool)
        .await
    }

    /// Capacity plus scan totals. Returns `None` if the group does not exist.
    pub async fn statistics(
        pool: &PgPool,
        id: DbId,
        today: NaiveDate,
    ) -> Result<Option<GroupStatistics>, sqlx::Error> {
        let Some(group) = Self::with_capacity(pool, id).await? else {
            return Ok(None);
        };
        let totals = Self::scan_totals(pool, id, today).await?;
        Ok(Some(GroupStatistics::compose(id, group.capacity(), totals)))
    }

    /// Students holding a seat in the group, ordered by name.
    pub async fn list_members(pool: &PgPool, id: DbId) -> Result<Vec<GroupMember>, sqlx::Error> {
        let query = format!(
            "SELECT e.id AS enrollment_id, u.id AS student_id, u.first_name, u.last_name,
                    u.email, u.matric_number, e.status, e.payment_status, e.assigned_at
             FROM enrollments e
             JOIN users u ON u.id = e.student_id
             WHERE e.group_id = $1 AND e.status IN {SEATED_STATUSES}
             ORDER BY u.first_name ASC, u.last_name ASC, u.id ASC"
        );
        sqlx::query_as::<_, GroupMember>(&query)
            .bind(id)
            .fetch_all(pool)
            .await
    }

    /// Students in the group whose accepted scans on `date` meet the requirement.
    pub async fn students_complete_on(
        pool: &PgPool,
        id: DbId,
        date: NaiveDate,
        default_required: i32,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM (
                SELECT se.student_id
                FROM scan_events se
                WHERE se.group_id = $1 AND se.scan_date = $2
                GROUP BY se.student_id
                HAVING COUNT(*) >= COALESCE(
                    (SELECT required_count FROM attendance_requirements
                      WHERE group_id = $1 AND date = $2),
                    $3)
             ) complete",
        )
        .bind(id)
        .bind(date)
        .bind(default_required)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
