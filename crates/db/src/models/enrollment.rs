//! Enrollment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vocatrack_core::attendance::EnrollmentSnapshot;
use vocatrack_core::enrollment::{EnrollmentStatus, EnrollmentView};
use vocatrack_core::types::{DbId, Timestamp};

/// A row from the `enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: DbId,
    pub student_id: DbId,
    pub skill_id: DbId,
    pub group_id: Option<DbId>,
    pub status: String,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub paid_at: Option<Timestamp>,
    pub assigned_at: Option<Timestamp>,
    pub activated_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Enrollment {
    /// Parsed status. Rows are constrained by `ck_enrollments_status`.
    pub fn status(&self) -> Result<EnrollmentStatus, String> {
        EnrollmentStatus::from_str_value(&self.status)
    }

    pub fn view(&self) -> EnrollmentView<'_> {
        EnrollmentView {
            status: &self.status,
            payment_status: &self.payment_status,
            group_id: self.group_id,
        }
    }

    pub fn snapshot(&self) -> Option<EnrollmentSnapshot> {
        self.status().ok().map(|status| EnrollmentSnapshot {
            status,
            group_id: self.group_id,
        })
    }
}

/// DTO for selecting a skill.
#[derive(Debug, Deserialize)]
pub struct CreateEnrollment {
    pub skill_id: DbId,
}

/// DTO for confirming payment.
#[derive(Debug, Deserialize)]
pub struct PayEnrollment {
    pub payment_reference: String,
}

/// DTO for allocating a group.
#[derive(Debug, Deserialize)]
pub struct AssignEnrollment {
    pub group_id: DbId,
}

/// Count of enrollments per status.
#[derive(Debug, Clone, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
