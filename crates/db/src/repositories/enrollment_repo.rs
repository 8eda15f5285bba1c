//! Repository for the `enrollments` table.

use sqlx::PgPool;
use vocatrack_core::capacity::GroupCapacity;
use vocatrack_core::enrollment::{validate_transition, EnrollmentStatus};
use vocatrack_core::types::{DbId, Timestamp};

use super::group_repo::SEATED_STATUSES;
use crate::models::enrollment::{Enrollment, StatusCount};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, student_id, skill_id, group_id, status, payment_status, \
                                  payment_reference, paid_at, assigned_at, activated_at, \
                                  completed_at, created_at, updated_at";

/// Result of [`EnrollmentRepo::assign_to_group`].
#[derive(Debug)]
pub enum AssignOutcome {
    Assigned(Enrollment),
    EnrollmentNotFound,
    GroupNotFound,
    /// The group belongs to a different skill than the enrollment.
    SkillMismatch,
    /// The enrollment is not in a status that may move to `assigned`.
    InvalidStatus(String),
    GroupFull(GroupCapacity),
}

/// Provides lifecycle operations for enrollments.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Select a skill. Fails with `uq_enrollments_one_open_per_student` if the
    /// student already holds an open enrollment.
    pub async fn create(
        pool: &PgPool,
        student_id: DbId,
        skill_id: DbId,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (student_id, skill_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(skill_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The student's enrollment that is not yet `completed`, if any.
    pub async fn find_open_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments WHERE student_id = $1 AND status <> 'completed'"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// List enrollments, newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn status_counts(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM enrollments GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    /// Record payment for a `selected` enrollment owned by `student_id`.
    ///
    /// Returns `None` when no such enrollment is in `selected` status.
    pub async fn mark_paid(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
        payment_reference: &str,
        now: Timestamp,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET
                status = 'paid',
                payment_status = 'paid',
                payment_reference = $3,
                paid_at = $4
             WHERE id = $1 AND student_id = $2 AND status = 'selected'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(student_id)
            .bind(payment_reference.trim())
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Allocate a group to a paid enrollment.
    ///
    /// The group row is locked for the duration of the check so two
    /// concurrent assignments cannot both take the last seat.
    pub async fn assign_to_group(
        pool: &PgPool,
        id: DbId,
        group_id: DbId,
        now: Timestamp,
    ) -> Result<AssignOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1 FOR UPDATE");
        let Some(enrollment) = sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(AssignOutcome::EnrollmentNotFound);
        };

        let status = match enrollment.status() {
            Ok(status) => status,
            Err(msg) => return Ok(AssignOutcome::InvalidStatus(msg)),
        };
        if let Err(msg) = validate_transition(status, EnrollmentStatus::Assigned) {
            return Ok(AssignOutcome::InvalidStatus(msg));
        }

        let group: Option<(DbId, i32)> = sqlx::query_as(
            "SELECT skill_id, max_student_capacity FROM skill_groups WHERE id = $1 FOR UPDATE",
        )
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((skill_id, max_student_capacity)) = group else {
            return Ok(AssignOutcome::GroupNotFound);
        };
        if skill_id != enrollment.skill_id {
            return Ok(AssignOutcome::SkillMismatch);
        }

        let (seated,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM enrollments WHERE group_id = $1 AND status IN {SEATED_STATUSES}"
        ))
        .bind(group_id)
        .fetch_one(&mut *tx)
        .await?;
        let capacity = GroupCapacity::new(seated, max_student_capacity);
        if capacity.ensure_can_assign().is_err() {
            return Ok(AssignOutcome::GroupFull(capacity));
        }

        let query = format!(
            "UPDATE enrollments SET status = 'assigned', group_id = $2, assigned_at = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let assigned = sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(group_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            enrollment_id = id,
            group_id,
            seated = seated + 1,
            max_student_capacity,
            "Enrollment assigned to group"
        );
        Ok(AssignOutcome::Assigned(assigned))
    }

    /// Close an `active` enrollment so the student may enroll again.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET status = 'completed', completed_at = $2
             WHERE id = $1 AND status = 'active'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}
