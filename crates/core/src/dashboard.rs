//! Read-only dashboard composition for admins, mentors, and students.
//!
//! Handlers load the raw rows; these functions only combine them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::academic_session::{resolve_active_session, SessionWindow};
use crate::attendance::AttendanceRecord;
use crate::capacity::GroupCapacity;
use crate::enrollment::ScanEligibility;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdminDashboard {
    pub active_session_id: Option<DbId>,
    pub total_sessions: usize,
    pub total_skills: i64,
    pub total_groups: usize,
    pub full_groups: usize,
    pub total_enrollments: i64,
    pub enrollments_by_status: BTreeMap<String, i64>,
    pub scans_today: i64,
}

pub fn compose_admin(
    sessions: &[SessionWindow],
    total_skills: i64,
    groups: &[GroupCapacity],
    enrollment_status_counts: &[(String, i64)],
    scans_today: i64,
    now: Timestamp,
) -> AdminDashboard {
    let enrollments_by_status: BTreeMap<String, i64> =
        enrollment_status_counts.iter().cloned().collect();

    AdminDashboard {
        active_session_id: resolve_active_session(sessions, now),
        total_sessions: sessions.len(),
        total_skills,
        total_groups: groups.len(),
        full_groups: groups.iter().filter(|g| g.is_full()).count(),
        total_enrollments: enrollments_by_status.values().sum(),
        enrollments_by_status,
        scans_today,
    }
}

// ---------------------------------------------------------------------------
// Mentor
// ---------------------------------------------------------------------------

/// Raw per-group numbers for a mentor's group.
#[derive(Debug, Clone)]
pub struct MentorGroupInput {
    pub group_id: DbId,
    pub group_number: i32,
    pub skill_title: String,
    pub capacity: GroupCapacity,
    pub scans_today: i64,
    pub students_complete_today: i64,
    pub active_tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MentorGroupSummary {
    pub group_id: DbId,
    pub group_number: i32,
    pub skill_title: String,
    pub current_member_count: i64,
    pub max_student_capacity: i32,
    pub capacity_percentage: u8,
    pub is_full: bool,
    pub scans_today: i64,
    pub students_complete_today: i64,
    pub active_tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MentorDashboard {
    pub active_session_id: Option<DbId>,
    pub groups: Vec<MentorGroupSummary>,
    pub total_students: i64,
    pub scans_today: i64,
}

pub fn compose_mentor(
    sessions: &[SessionWindow],
    groups: Vec<MentorGroupInput>,
    now: Timestamp,
) -> MentorDashboard {
    let groups: Vec<MentorGroupSummary> = groups
        .into_iter()
        .map(|g| MentorGroupSummary {
            group_id: g.group_id,
            group_number: g.group_number,
            skill_title: g.skill_title,
            current_member_count: g.capacity.current_member_count,
            max_student_capacity: g.capacity.max_student_capacity,
            capacity_percentage: g.capacity.capacity_percentage(),
            is_full: g.capacity.is_full(),
            scans_today: g.scans_today,
            students_complete_today: g.students_complete_today,
            active_tokens: g.active_tokens,
        })
        .collect();

    MentorDashboard {
        active_session_id: resolve_active_session(sessions, now),
        total_students: groups.iter().map(|g| g.current_member_count).sum(),
        scans_today: groups.iter().map(|g| g.scans_today).sum(),
        groups,
    }
}

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StudentDashboard {
    pub active_session_id: Option<DbId>,
    pub eligibility: ScanEligibility,
    pub today: Option<AttendanceRecord>,
    pub total_scans: i64,
    pub total_points: i64,
}

pub fn compose_student(
    sessions: &[SessionWindow],
    eligibility: ScanEligibility,
    today: Option<AttendanceRecord>,
    total_scans: i64,
    total_points: i64,
    now: Timestamp,
) -> StudentDashboard {
    StudentDashboard {
        active_session_id: resolve_active_session(sessions, now),
        eligibility,
        today,
        total_scans,
        total_points,
    }
}
