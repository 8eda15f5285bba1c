//! Loads the inputs of a group attendance report.

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use vocatrack_core::report::{
    aggregate_report, full_name, AttendanceReport, GroupInfo, RosterEntry, ScanFact,
};
use vocatrack_core::types::{DbId, Timestamp};

#[derive(FromRow)]
struct GroupInfoRow {
    id: DbId,
    group_number: i32,
    skill_title: String,
    practical_date: Option<NaiveDate>,
}

#[derive(FromRow)]
struct RosterRow {
    student_id: DbId,
    first_name: String,
    last_name: String,
    matric_number: Option<String>,
    /// Currently assigned here, as opposed to only having scanned here.
    enrolled: bool,
}

#[derive(FromRow)]
struct ScanRow {
    student_id: DbId,
    points_awarded: i32,
    created_at: Timestamp,
}

pub struct ReportRepo;

impl ReportRepo {
    /// Build the attendance report for a group from stored scan events.
    ///
    /// The roster is every student whose enrollment points at the group
    /// (assigned, active or completed) plus every student with a scan in the
    /// group, so a student moved to another group keeps the scans made here.
    /// `total_enrolled` counts only the first set. Reads share one
    /// repeatable-read snapshot. Returns `None` if the group does not exist.
    pub async fn group_report(
        pool: &PgPool,
        group_id: DbId,
    ) -> Result<Option<AttendanceReport>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let info = sqlx::query_as::<_, GroupInfoRow>(
            "SELECT g.id, g.group_number, s.title AS skill_title, g.practical_date
             FROM skill_groups g
             JOIN skills s ON s.id = g.skill_id
             WHERE g.id = $1",
        )
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(info) = info else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, RosterRow>(
            "SELECT u.id AS student_id, u.first_name, u.last_name, u.matric_number,
                    bool_or(m.enrolled) AS enrolled
             FROM (
                 SELECT e.student_id, true AS enrolled
                 FROM enrollments e
                 WHERE e.group_id = $1 AND e.status IN ('assigned', 'active', 'completed')
                 UNION ALL
                 SELECT se.student_id, false AS enrolled
                 FROM scan_events se
                 WHERE se.group_id = $1
             ) m
             JOIN users u ON u.id = m.student_id
             GROUP BY u.id, u.first_name, u.last_name, u.matric_number",
        )
        .bind(group_id)
        .fetch_all(&mut *tx)
        .await?;

        let total_enrolled = rows.iter().filter(|row| row.enrolled).count() as i64;
        let roster: Vec<RosterEntry> = rows
            .into_iter()
            .map(|row| RosterEntry {
                student_id: row.student_id,
                full_name: full_name(&row.first_name, &row.last_name),
                matric_number: row.matric_number,
            })
            .collect();

        let scans: Vec<ScanFact> = sqlx::query_as::<_, ScanRow>(
            "SELECT student_id, points_awarded, created_at
             FROM scan_events
             WHERE group_id = $1
             ORDER BY id ASC",
        )
        .bind(group_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| ScanFact {
            student_id: row.student_id,
            points_awarded: row.points_awarded,
            created_at: row.created_at,
        })
        .collect();

        tx.commit().await?;

        let group_info = GroupInfo {
            id: info.id,
            group_number: info.group_number,
            skill_title: info.skill_title,
            practical_date: info.practical_date,
            total_enrolled,
        };
        Ok(Some(aggregate_report(group_info, &roster, &scans)))
    }
}
