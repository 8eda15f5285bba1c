//! Attendance requirement resolution and scan admission rules.
//!
//! Completion is a pure function of persisted scan events and the
//! requirement row for a (group, date). Nothing held by a client contributes
//! to it, so dashboards and reports on any device agree.
//!
//! Duplicate policy: a scan that would exceed the day's requirement, or that
//! repeats a token the student already used, is rejected outright. Every
//! stored scan event therefore counts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enrollment::EnrollmentStatus;
use crate::qr_token::TokenStatus;
use crate::scan_rejection::ScanRejection;
use crate::types::{DbId, Timestamp};

/// Scans required per day when a group has no requirement row for the date.
pub const DEFAULT_REQUIRED_SCANS: i32 = 3;

/// Largest per-day requirement a mentor may configure.
pub const MAX_REQUIRED_SCANS: i32 = 20;

// ---------------------------------------------------------------------------
// Requirement resolution
// ---------------------------------------------------------------------------

/// Attendance dates are UTC calendar dates.
pub fn scan_date(ts: Timestamp) -> NaiveDate {
    ts.date_naive()
}

/// Use the configured requirement for the date, or the policy default.
pub fn resolve_required_count(configured: Option<i32>, default: i32) -> i32 {
    configured.unwrap_or(default).max(1)
}

pub fn validate_required_count(count: i32) -> Result<(), String> {
    if !(1..=MAX_REQUIRED_SCANS).contains(&count) {
        return Err(format!(
            "required_count must be between 1 and {MAX_REQUIRED_SCANS}, got {count}"
        ));
    }
    Ok(())
}

/// Number of scans that count toward the requirement, clamped to `[0, required]`.
pub fn completed_count(accepted_scans: i64, required: i32) -> i32 {
    accepted_scans.clamp(0, i64::from(required.max(0))) as i32
}

pub fn is_attendance_complete(completed: i32, required: i32) -> bool {
    completed == required
}

pub fn remaining_scans(completed: i32, required: i32) -> i32 {
    (required - completed).max(0)
}

// ---------------------------------------------------------------------------
// Derived attendance record
// ---------------------------------------------------------------------------

/// Per-student, per-date attendance, computed on read and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttendanceRecord {
    pub student_id: DbId,
    pub group_id: DbId,
    pub date: NaiveDate,
    pub completed_count: i32,
    pub required_count: i32,
    pub remaining_count: i32,
    pub is_complete: bool,
}

pub fn derive_record(
    student_id: DbId,
    group_id: DbId,
    date: NaiveDate,
    accepted_scans: i64,
    required: i32,
) -> AttendanceRecord {
    let completed = completed_count(accepted_scans, required);
    AttendanceRecord {
        student_id,
        group_id,
        date,
        completed_count: completed,
        required_count: required,
        remaining_count: remaining_scans(completed, required),
        is_complete: is_attendance_complete(completed, required),
    }
}

// ---------------------------------------------------------------------------
// Scan admission
// ---------------------------------------------------------------------------

/// The token as the recorder loaded it.
#[derive(Debug, Clone)]
pub struct TokenSnapshot {
    pub group_id: DbId,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

/// The student's open enrollment as the recorder loaded it.
#[derive(Debug, Clone)]
pub struct EnrollmentSnapshot {
    pub status: EnrollmentStatus,
    pub group_id: Option<DbId>,
}

/// Everything the admission rule needs, pre-loaded by the caller.
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub now: Timestamp,
    pub token: TokenSnapshot,
    pub session_active: bool,
    pub enrollment: Option<EnrollmentSnapshot>,
    /// Whether an accepted scan already exists for (student, token).
    pub token_already_used: bool,
    /// Accepted scans for the student on the token's attendance date.
    pub accepted_today: i64,
    pub required_today: i32,
}

/// Decide whether a scan may be accepted.
///
/// Checks run from the token outward: token state, session, enrollment,
/// group, then duplicates. The first failing check names the reason.
pub fn evaluate_scan(ctx: &ScanContext) -> Result<(), ScanRejection> {
    match TokenStatus::evaluate(ctx.token.expires_at, ctx.token.revoked_at, ctx.now) {
        TokenStatus::Revoked => return Err(ScanRejection::InvalidToken),
        TokenStatus::Expired => return Err(ScanRejection::ExpiredToken),
        TokenStatus::Valid => {}
    }

    if !ctx.session_active {
        return Err(ScanRejection::SessionInactive);
    }

    let enrollment = ctx.enrollment.as_ref().ok_or(ScanRejection::NotAssigned)?;
    if !enrollment.status.can_scan() {
        return Err(ScanRejection::NotAssigned);
    }
    let group_id = enrollment.group_id.ok_or(ScanRejection::NotAssigned)?;
    if group_id != ctx.token.group_id {
        return Err(ScanRejection::WrongGroup);
    }

    if ctx.token_already_used {
        return Err(ScanRejection::AlreadyScanned);
    }
    if completed_count(ctx.accepted_today, ctx.required_today) >= ctx.required_today {
        return Err(ScanRejection::AlreadyScanned);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn ctx() -> ScanContext {
        let now = Utc::now();
        ScanContext {
            now,
            token: TokenSnapshot {
                group_id: 7,
                expires_at: now + Duration::minutes(30),
                revoked_at: None,
            },
            session_active: true,
            enrollment: Some(EnrollmentSnapshot {
                status: EnrollmentStatus::Assigned,
                group_id: Some(7),
            }),
            token_already_used: false,
            accepted_today: 0,
            required_today: 3,
        }
    }

    // -- Requirement ---------------------------------------------------------

    #[test]
    fn default_requirement_applies_without_row() {
        assert_eq!(resolve_required_count(None, DEFAULT_REQUIRED_SCANS), 3);
        assert_eq!(resolve_required_count(Some(5), DEFAULT_REQUIRED_SCANS), 5);
    }

    #[test]
    fn completed_count_is_clamped() {
        assert_eq!(completed_count(-1, 3), 0);
        assert_eq!(completed_count(2, 3), 2);
        assert_eq!(completed_count(9, 3), 3);
    }

    #[test]
    fn completed_count_is_monotonic_and_bounded() {
        let mut previous = 0;
        for raw in 0..10 {
            let c = completed_count(raw, 4);
            assert!(c >= previous);
            assert!(c <= 4);
            previous = c;
        }
    }

    #[test]
    fn record_reports_completion() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let partial = derive_record(1, 2, date, 2, 3);
        assert_eq!(partial.remaining_count, 1);
        assert!(!partial.is_complete);

        let full = derive_record(1, 2, date, 4, 3);
        assert_eq!(full.completed_count, 3);
        assert_eq!(full.remaining_count, 0);
        assert!(full.is_complete);
    }

    #[test]
    fn required_count_bounds() {
        assert!(validate_required_count(0).is_err());
        assert!(validate_required_count(3).is_ok());
        assert!(validate_required_count(MAX_REQUIRED_SCANS + 1).is_err());
    }

    // -- Admission -----------------------------------------------------------

    #[test]
    fn eligible_scan_is_admitted() {
        assert_eq!(evaluate_scan(&ctx()), Ok(()));
    }

    #[test]
    fn active_enrollment_may_scan() {
        let mut c = ctx();
        c.enrollment.as_mut().unwrap().status = EnrollmentStatus::Active;
        assert_eq!(evaluate_scan(&c), Ok(()));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut c = ctx();
        c.token.expires_at = c.now;
        assert_eq!(evaluate_scan(&c), Err(ScanRejection::ExpiredToken));
    }

    #[test]
    fn revoked_token_is_invalid() {
        let mut c = ctx();
        c.token.revoked_at = Some(c.now - Duration::minutes(1));
        assert_eq!(evaluate_scan(&c), Err(ScanRejection::InvalidToken));
    }

    #[test]
    fn inactive_session_is_rejected() {
        let mut c = ctx();
        c.session_active = false;
        assert_eq!(evaluate_scan(&c), Err(ScanRejection::SessionInactive));
    }

    #[test]
    fn missing_or_paid_enrollment_is_not_assigned() {
        let mut c = ctx();
        c.enrollment = None;
        assert_eq!(evaluate_scan(&c), Err(ScanRejection::NotAssigned));

        let mut c = ctx();
        c.enrollment = Some(EnrollmentSnapshot {
            status: EnrollmentStatus::Paid,
            group_id: None,
        });
        assert_eq!(evaluate_scan(&c), Err(ScanRejection::NotAssigned));
    }

    #[test]
    fn other_group_is_rejected() {
        let mut c = ctx();
        c.token.group_id = 8;
        assert_eq!(evaluate_scan(&c), Err(ScanRejection::WrongGroup));
    }

    #[test]
    fn reused_token_is_already_scanned() {
        let mut c = ctx();
        c.token_already_used = true;
        assert_eq!(evaluate_scan(&c), Err(ScanRejection::AlreadyScanned));
    }

    #[test]
    fn scans_beyond_requirement_are_rejected() {
        let mut c = ctx();
        c.accepted_today = 3;
        assert_eq!(evaluate_scan(&c), Err(ScanRejection::AlreadyScanned));

        c.accepted_today = 2;
        assert_eq!(evaluate_scan(&c), Ok(()));
    }
}
