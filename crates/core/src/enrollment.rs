//! Enrollment lifecycle and scan eligibility.
//!
//! `selected -> paid -> assigned -> active -> completed`. A student holds at
//! most one enrollment that is not `completed` (enforced by a partial unique
//! index in the database).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_SELECTED: &str = "selected";
pub const STATUS_PAID: &str = "paid";
pub const STATUS_ASSIGNED: &str = "assigned";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_SELECTED,
    STATUS_PAID,
    STATUS_ASSIGNED,
    STATUS_ACTIVE,
    STATUS_COMPLETED,
];

pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_PAID: &str = "paid";
pub const PAYMENT_FAILED: &str = "failed";
pub const PAYMENT_REFUNDED: &str = "refunded";

pub const VALID_PAYMENT_STATUSES: &[&str] =
    &[PAYMENT_PENDING, PAYMENT_PAID, PAYMENT_FAILED, PAYMENT_REFUNDED];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EnrollmentStatus {
    Selected,
    Paid,
    Assigned,
    Active,
    Completed,
}

impl EnrollmentStatus {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_SELECTED => Ok(Self::Selected),
            STATUS_PAID => Ok(Self::Paid),
            STATUS_ASSIGNED => Ok(Self::Assigned),
            STATUS_ACTIVE => Ok(Self::Active),
            STATUS_COMPLETED => Ok(Self::Completed),
            _ => Err(format!(
                "Invalid enrollment status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selected => STATUS_SELECTED,
            Self::Paid => STATUS_PAID,
            Self::Assigned => STATUS_ASSIGNED,
            Self::Active => STATUS_ACTIVE,
            Self::Completed => STATUS_COMPLETED,
        }
    }

    /// The only state each status may advance to.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Selected => Some(Self::Paid),
            Self::Paid => Some(Self::Assigned),
            Self::Assigned => Some(Self::Active),
            Self::Active => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Assigned and active enrollments may record scans.
    pub fn can_scan(&self) -> bool {
        matches!(self, Self::Assigned | Self::Active)
    }

    /// Every status except `completed` blocks a new enrollment.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            PAYMENT_PENDING => Ok(Self::Pending),
            PAYMENT_PAID => Ok(Self::Paid),
            PAYMENT_FAILED => Ok(Self::Failed),
            PAYMENT_REFUNDED => Ok(Self::Refunded),
            _ => Err(format!(
                "Invalid payment status '{s}'. Must be one of: {}",
                VALID_PAYMENT_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => PAYMENT_PENDING,
            Self::Paid => PAYMENT_PAID,
            Self::Failed => PAYMENT_FAILED,
            Self::Refunded => PAYMENT_REFUNDED,
        }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Validate a status change. Only single forward steps are allowed.
pub fn validate_transition(from: EnrollmentStatus, to: EnrollmentStatus) -> Result<(), String> {
    if from.next() == Some(to) {
        Ok(())
    } else {
        Err(format!(
            "Cannot move enrollment from '{}' to '{}'",
            from.as_str(),
            to.as_str()
        ))
    }
}

/// A new enrollment is allowed only when the student has no open one.
pub fn ensure_no_open_enrollment(existing: Option<EnrollmentStatus>) -> Result<(), String> {
    match existing {
        Some(status) if status.is_open() => Err(format!(
            "Student already has an enrollment in '{}' status. Only one skill at a time is allowed.",
            status.as_str()
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Scan eligibility
// ---------------------------------------------------------------------------

/// What the scan page should show for a student's enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case", tag = "state")]
#[ts(export)]
pub enum ScanEligibility {
    /// No open enrollment: show the "No Active Enrollment" empty state.
    NoActiveEnrollment,
    /// Enrolled but not yet in a group. Raw status strings are echoed verbatim.
    GroupAssignmentRequired {
        status: String,
        payment_status: String,
    },
    /// The scanner may be rendered.
    Eligible { group_id: DbId },
}

/// The fields of an enrollment the scan page looks at.
#[derive(Debug, Clone)]
pub struct EnrollmentView<'a> {
    pub status: &'a str,
    pub payment_status: &'a str,
    pub group_id: Option<DbId>,
}

impl ScanEligibility {
    pub fn evaluate(enrollment: Option<&EnrollmentView<'_>>) -> Self {
        let Some(view) = enrollment else {
            return Self::NoActiveEnrollment;
        };

        let status = match EnrollmentStatus::from_str_value(view.status) {
            Ok(s) => s,
            Err(_) => return Self::NoActiveEnrollment,
        };
        if !status.is_open() {
            return Self::NoActiveEnrollment;
        }

        match (status.can_scan(), view.group_id) {
            (true, Some(group_id)) => Self::Eligible { group_id },
            _ => Self::GroupAssignmentRequired {
                status: view.status.to_string(),
                payment_status: view.payment_status.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_payment_reference(reference: &str) -> Result<(), String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err("payment_reference must not be empty".to_string());
    }
    if trimmed.len() > 128 {
        return Err("payment_reference must be at most 128 characters".to_string());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
