//! Response schemas for endpoints whose payloads are not shared domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vocatrack_core::enrollment::{EnrollmentStatus, PaymentStatus, ScanEligibility};
use vocatrack_core::qr_token::TokenStatus;
use vocatrack_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub matric_number: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AcademicSession {
    pub id: DbId,
    pub name: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAcademicSession {
    pub name: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Skill {
    pub id: DbId,
    pub academic_session_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub price_minor: i64,
    pub is_active: bool,
}

/// Status fields decode into the closed enums; an unknown value is a
/// schema error rather than a string passed through to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Enrollment {
    pub id: DbId,
    pub student_id: DbId,
    pub skill_id: DbId,
    pub group_id: Option<DbId>,
    pub status: EnrollmentStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MyEnrollment {
    pub enrollment: Option<Enrollment>,
    pub eligibility: ScanEligibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScanHistoryEntry {
    pub id: DbId,
    pub group_id: DbId,
    pub group_number: i32,
    pub skill_title: String,
    pub label: Option<String>,
    pub scan_date: NaiveDate,
    pub points_awarded: i32,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSkill {
    pub academic_session_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub price_minor: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SkillChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_minor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A skill group with its live capacity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
    pub id: DbId,
    pub skill_id: DbId,
    pub group_number: i32,
    pub mentor_id: Option<DbId>,
    pub practical_date: Option<NaiveDate>,
    pub max_student_capacity: i32,
    pub location: Option<String>,
    pub skill_title: String,
    pub current_member_count: i64,
    pub is_full: bool,
    pub capacity_percentage: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGroup {
    pub group_number: i32,
    pub mentor_id: Option<DbId>,
    pub practical_date: Option<NaiveDate>,
    pub max_student_capacity: i32,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practical_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_student_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupStatistics {
    pub group_id: DbId,
    pub current_member_count: i64,
    pub max_student_capacity: i32,
    pub available_seats: i64,
    pub capacity_percentage: u8,
    pub is_full: bool,
    pub total_scans: i64,
    pub total_points: i64,
    pub scans_today: i64,
    pub active_tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupMember {
    pub enrollment_id: DbId,
    pub student_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub matric_number: Option<String>,
    pub status: EnrollmentStatus,
    pub payment_status: PaymentStatus,
    pub assigned_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceRequirement {
    pub id: DbId,
    pub group_id: DbId,
    pub date: NaiveDate,
    pub required_count: i32,
}

/// Per-date overrides, plus the count every other date uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupRequirements {
    pub group_id: DbId,
    pub default_required_count: i32,
    pub requirements: Vec<AttendanceRequirement>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewQrToken {
    pub group_id: DbId,
    pub label: Option<String>,
    pub points_per_scan: Option<i32>,
    pub valid_for_minutes: Option<i64>,
}

/// An issued token. `payload` is what the QR image encodes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QrToken {
    pub id: DbId,
    pub token: String,
    pub group_id: DbId,
    pub mentor_id: Option<DbId>,
    pub label: Option<String>,
    pub points_per_scan: i32,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub status: TokenStatus,
    pub payload: String,
}
