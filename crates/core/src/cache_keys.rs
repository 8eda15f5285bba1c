//! Read-cache keys and the invalidation table for mutations.
//!
//! After the server confirms a mutation, every key listed by
//! [`Mutation::invalidates`] is dropped so the next read refetches.

use std::time::Duration;

use crate::types::DbId;

/// How often an open scan page refreshes the student's history.
pub const SCAN_HISTORY_POLL: Duration = Duration::from_secs(5);

/// How often an open group report refreshes.
pub const REPORT_POLL: Duration = Duration::from_secs(10);

/// Identifies one cached read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    AcademicSessions,
    ActiveSession,
    Skills,
    SkillGroups(DbId),
    Group(DbId),
    GroupStatistics(DbId),
    GroupMembers(DbId),
    GroupReport(DbId),
    GroupRequirements(DbId),
    Enrollments,
    MyEnrollment,
    QrTokens(DbId),
    ScanHistory,
    MyAttendance,
    AdminDashboard,
    MentorDashboard,
    StudentDashboard,
}

impl QueryKey {
    /// Keys scoped to one group share its id; global keys return `None`.
    pub fn group_id(&self) -> Option<DbId> {
        match self {
            Self::Group(id)
            | Self::GroupStatistics(id)
            | Self::GroupMembers(id)
            | Self::GroupReport(id)
            | Self::GroupRequirements(id)
            | Self::QrTokens(id) => Some(*id),
            _ => None,
        }
    }
}

/// A write the client can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    ScanSubmit { group_id: DbId },
    SessionCreate,
    SessionUpdate,
    SessionDelete,
    SessionStart,
    SessionEnd,
    SkillCreate,
    SkillUpdate,
    SkillDelete,
    GroupCreate { skill_id: DbId },
    GroupUpdate { skill_id: DbId, group_id: DbId },
    GroupDelete { skill_id: DbId, group_id: DbId },
    EnrollmentCreate,
    EnrollmentPay,
    EnrollmentAssign { group_id: DbId },
    EnrollmentComplete { group_id: DbId },
    QrGenerate { group_id: DbId },
    QrRevoke { group_id: DbId },
    RequirementSet { group_id: DbId },
}

impl Mutation {
    pub fn invalidates(&self) -> Vec<QueryKey> {
        use QueryKey::*;

        match *self {
            Self::ScanSubmit { group_id } => vec![
                ScanHistory,
                MyAttendance,
                MyEnrollment,
                StudentDashboard,
                MentorDashboard,
                AdminDashboard,
                GroupReport(group_id),
                GroupStatistics(group_id),
            ],
            Self::SessionCreate | Self::SessionUpdate | Self::SessionDelete => {
                vec![AcademicSessions, ActiveSession, AdminDashboard]
            }
            Self::SessionStart | Self::SessionEnd => vec![
                AcademicSessions,
                ActiveSession,
                AdminDashboard,
                MentorDashboard,
                StudentDashboard,
            ],
            Self::SkillCreate | Self::SkillUpdate | Self::SkillDelete => {
                vec![Skills, AdminDashboard]
            }
            Self::GroupCreate { skill_id } => vec![SkillGroups(skill_id), Skills, AdminDashboard],
            Self::GroupUpdate { skill_id, group_id } | Self::GroupDelete { skill_id, group_id } => {
                vec![
                    SkillGroups(skill_id),
                    Group(group_id),
                    GroupStatistics(group_id),
                    AdminDashboard,
                    MentorDashboard,
                ]
            }
            Self::EnrollmentCreate | Self::EnrollmentPay => {
                vec![Enrollments, MyEnrollment, StudentDashboard, AdminDashboard]
            }
            Self::EnrollmentAssign { group_id } | Self::EnrollmentComplete { group_id } => vec![
                Enrollments,
                MyEnrollment,
                Group(group_id),
                GroupMembers(group_id),
                GroupStatistics(group_id),
                GroupReport(group_id),
                StudentDashboard,
                MentorDashboard,
                AdminDashboard,
            ],
            Self::QrGenerate { group_id } | Self::QrRevoke { group_id } => {
                vec![QrTokens(group_id), MentorDashboard]
            }
            Self::RequirementSet { group_id } => vec![
                GroupRequirements(group_id),
                GroupReport(group_id),
                MyAttendance,
                StudentDashboard,
            ],
        }
    }
}
