//! Repository for the `scan_events` table, including the scan recorder.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use vocatrack_core::attendance::{
    completed_count, evaluate_scan, resolve_required_count, scan_date, ScanContext,
};
use vocatrack_core::enrollment::EnrollmentStatus;
use vocatrack_core::scan_flow::ScanReceipt;
use vocatrack_core::scan_rejection::ScanRejection;
use vocatrack_core::types::DbId;

use super::{enrollment_repo, qr_token_repo};
use crate::models::enrollment::Enrollment;
use crate::models::qr_token::QrToken;
use crate::models::scan_event::{RecordOutcome, RecordScan, ScanEvent, ScanHistoryEntry};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, student_id, qr_token_id, group_id, enrollment_id, scan_date, \
                       points_awarded, device_info, client_request_id, created_at";

/// Records and reads accepted scans.
pub struct ScanEventRepo;

impl ScanEventRepo {
    /// Decide and, if admitted, persist one scan.
    ///
    /// Runs in a single transaction holding a lock on the student's open
    /// enrollment, so one student's scans are decided one at a time. A request
    /// whose `client_request_id` was already recorded returns the original
    /// receipt with `replayed = true` instead of a rejection. The first
    /// accepted scan moves an `assigned` enrollment to `active`.
    pub async fn record(pool: &PgPool, input: &RecordScan) -> Result<RecordOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {} FROM enrollments
             WHERE student_id = $1 AND status <> 'completed'
             FOR UPDATE",
            enrollment_repo::COLUMNS
        );
        let enrollment = sqlx::query_as::<_, Enrollment>(&query)
            .bind(input.student_id)
            .fetch_optional(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM scan_events WHERE student_id = $1 AND client_request_id = $2"
        );
        let previous = sqlx::query_as::<_, ScanEvent>(&query)
            .bind(input.student_id)
            .bind(input.client_request_id)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(event) = previous {
            let receipt = replayed_receipt(&mut *tx, &event, input.default_required).await?;
            tx.commit().await?;
            tracing::info!(
                scan_id = event.id,
                student_id = input.student_id,
                "Replayed scan request"
            );
            return Ok(RecordOutcome::Accepted(receipt));
        }

        let query = format!(
            "SELECT {} FROM qr_tokens WHERE token = $1",
            qr_token_repo::COLUMNS
        );
        let Some(token) = sqlx::query_as::<_, QrToken>(&query)
            .bind(&input.token)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(reject(input, ScanRejection::InvalidToken));
        };

        let today = scan_date(input.now);

        let session_active: Option<(bool,)> = sqlx::query_as(
            "SELECT a.active
             FROM skill_groups g
             JOIN skills s ON s.id = g.skill_id
             JOIN academic_sessions a ON a.id = s.academic_session_id
             WHERE g.id = $1",
        )
        .bind(token.group_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (token_already_used,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM scan_events WHERE student_id = $1 AND qr_token_id = $2)",
        )
        .bind(input.student_id)
        .bind(token.id)
        .fetch_one(&mut *tx)
        .await?;

        let accepted_today =
            count_on(&mut *tx, input.student_id, token.group_id, today).await?;
        let required_today =
            required_on(&mut *tx, token.group_id, today, input.default_required).await?;

        let ctx = ScanContext {
            now: input.now,
            token: token.snapshot(),
            session_active: session_active.is_some_and(|(active,)| active),
            enrollment: enrollment.as_ref().and_then(Enrollment::snapshot),
            token_already_used,
            accepted_today,
            required_today,
        };
        if let Err(reason) = evaluate_scan(&ctx) {
            return Ok(reject(input, reason));
        }
        let Some(enrollment) = enrollment else {
            return Ok(reject(input, ScanRejection::NotAssigned));
        };

        let query = format!(
            "INSERT INTO scan_events
                (student_id, qr_token_id, group_id, enrollment_id, scan_date, points_awarded,
                 device_info, client_request_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {COLUMNS}"
        );
        let event = sqlx::query_as::<_, ScanEvent>(&query)
            .bind(input.student_id)
            .bind(token.id)
            .bind(token.group_id)
            .bind(enrollment.id)
            .bind(today)
            .bind(token.points_per_scan)
            .bind(&input.device_info)
            .bind(input.client_request_id)
            .bind(input.now)
            .fetch_one(&mut *tx)
            .await?;

        if enrollment.status().ok() == Some(EnrollmentStatus::Assigned) {
            sqlx::query(
                "UPDATE enrollments SET status = 'active', activated_at = $2
                 WHERE id = $1 AND status = 'assigned'",
            )
            .bind(enrollment.id)
            .bind(input.now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let completed = completed_count(accepted_today + 1, required_today);
        tracing::info!(
            scan_id = event.id,
            student_id = input.student_id,
            group_id = token.group_id,
            completed,
            required = required_today,
            "Scan accepted"
        );

        Ok(RecordOutcome::Accepted(ScanReceipt {
            scan_id: event.id,
            points_awarded: event.points_awarded,
            created_at: event.created_at,
            completed_count: completed,
            required_count: required_today,
            replayed: false,
        }))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ScanEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scan_events WHERE id = $1");
        sqlx::query_as::<_, ScanEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A student's scans, newest first.
    pub async fn history_for_student(
        pool: &PgPool,
        student_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ScanHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, ScanHistoryEntry>(
            "SELECT se.id, se.group_id, g.group_number, s.title AS skill_title, t.label,
                    se.scan_date, se.points_awarded, se.created_at
             FROM scan_events se
             JOIN skill_groups g ON g.id = se.group_id
             JOIN skills s ON s.id = g.skill_id
             JOIN qr_tokens t ON t.id = se.qr_token_id
             WHERE se.student_id = $1
             ORDER BY se.created_at DESC, se.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(student_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Accepted scans for (student, group) on one UTC date.
    pub async fn count_for_date(
        pool: &PgPool,
        student_id: DbId,
        group_id: DbId,
        date: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        count_on(&mut *conn, student_id, group_id, date).await
    }

    /// Lifetime (scan count, points) for a student.
    pub async fn totals_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(points_awarded), 0)::BIGINT
             FROM scan_events WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(pool)
        .await
    }

    /// Scans across all groups on one UTC date.
    pub async fn count_all_on(pool: &PgPool, date: NaiveDate) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scan_events WHERE scan_date = $1")
            .bind(date)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

fn reject(input: &RecordScan, reason: ScanRejection) -> RecordOutcome {
    tracing::info!(
        student_id = input.student_id,
        reason = reason.as_str(),
        "Scan rejected"
    );
    RecordOutcome::Rejected(reason)
}

async fn count_on(
    conn: &mut PgConnection,
    student_id: DbId,
    group_id: DbId,
    date: NaiveDate,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM scan_events
         WHERE student_id = $1 AND group_id = $2 AND scan_date = $3",
    )
    .bind(student_id)
    .bind(group_id)
    .bind(date)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

async fn required_on(
    conn: &mut PgConnection,
    group_id: DbId,
    date: NaiveDate,
    default_required: i32,
) -> Result<i32, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        "SELECT required_count FROM attendance_requirements WHERE group_id = $1 AND date = $2",
    )
    .bind(group_id)
    .bind(date)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(resolve_required_count(row.map(|(n,)| n), default_required))
}

/// Rebuild the receipt for an already-recorded scan as of the moment it was accepted.
async fn replayed_receipt(
    conn: &mut PgConnection,
    event: &ScanEvent,
    default_required: i32,
) -> Result<ScanReceipt, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM scan_events
         WHERE student_id = $1 AND group_id = $2 AND scan_date = $3 AND id <= $4",
    )
    .bind(event.student_id)
    .bind(event.group_id)
    .bind(event.scan_date)
    .bind(event.id)
    .fetch_one(&mut *conn)
    .await?;
    let required = required_on(conn, event.group_id, event.scan_date, default_required).await?;
    Ok(ScanReceipt {
        scan_id: event.id,
        points_awarded: event.points_awarded,
        created_at: event.created_at,
        completed_count: completed_count(count, required),
        required_count: required,
        replayed: true,
    })
}
