//! Skill group entity model, capacity views, and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vocatrack_core::capacity::GroupCapacity;
use vocatrack_core::types::{DbId, Timestamp};

/// A row from the `skill_groups` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SkillGroup {
    pub id: DbId,
    pub skill_id: DbId,
    pub group_number: i32,
    pub mentor_id: Option<DbId>,
    pub practical_date: Option<NaiveDate>,
    pub max_student_capacity: i32,
    pub location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A group joined with its skill title and live member count.
#[derive(Debug, Clone, FromRow)]
pub struct GroupWithCapacity {
    #[sqlx(flatten)]
    pub group: SkillGroup,
    pub skill_title: String,
    pub current_member_count: i64,
}

impl GroupWithCapacity {
    pub fn capacity(&self) -> GroupCapacity {
        GroupCapacity::new(self.current_member_count, self.group.max_student_capacity)
    }
}

/// Read view of a group as the API returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResponse {
    #[serde(flatten)]
    pub group: SkillGroup,
    pub skill_title: String,
    pub current_member_count: i64,
    pub is_full: bool,
    pub capacity_percentage: u8,
}

impl From<GroupWithCapacity> for GroupResponse {
    fn from(row: GroupWithCapacity) -> Self {
        let capacity = row.capacity();
        Self {
            group: row.group,
            skill_title: row.skill_title,
            current_member_count: row.current_member_count,
            is_full: capacity.is_full(),
            capacity_percentage: capacity.capacity_percentage(),
        }
    }
}

/// Scan totals for one group.
#[derive(Debug, Clone, FromRow)]
pub struct GroupScanTotals {
    pub total_scans: i64,
    pub total_points: i64,
    pub scans_today: i64,
    pub active_tokens: i64,
}

/// `GET /groups/{id}/statistics` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
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

impl GroupStatistics {
    pub fn compose(group_id: DbId, capacity: GroupCapacity, totals: GroupScanTotals) -> Self {
        Self {
            group_id,
            current_member_count: capacity.current_member_count,
            max_student_capacity: capacity.max_student_capacity,
            available_seats: capacity.available_seats(),
            capacity_percentage: capacity.capacity_percentage(),
            is_full: capacity.is_full(),
            total_scans: totals.total_scans,
            total_points: totals.total_points,
            scans_today: totals.scans_today,
            active_tokens: totals.active_tokens,
        }
    }
}

/// A student assigned to a group.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GroupMember {
    pub enrollment_id: DbId,
    pub student_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub matric_number: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub assigned_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroup {
    pub group_number: i32,
    pub mentor_id: Option<DbId>,
    pub practical_date: Option<NaiveDate>,
    pub max_student_capacity: i32,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroup {
    pub group_number: Option<i32>,
    pub mentor_id: Option<DbId>,
    pub practical_date: Option<NaiveDate>,
    pub max_student_capacity: Option<i32>,
    pub location: Option<String>,
}
