//! Scan event entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use vocatrack_core::scan_flow::ScanReceipt;
use vocatrack_core::scan_rejection::ScanRejection;
use vocatrack_core::types::{DbId, Timestamp};

/// A row from the `scan_events` table. Rows are never updated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScanEvent {
    pub id: DbId,
    pub student_id: DbId,
    pub qr_token_id: DbId,
    pub group_id: DbId,
    pub enrollment_id: DbId,
    pub scan_date: NaiveDate,
    pub points_awarded: i32,
    pub device_info: Option<serde_json::Value>,
    pub client_request_id: Uuid,
    pub created_at: Timestamp,
}

/// A scan as listed in the student's history.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
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

/// Input for [`crate::repositories::ScanEventRepo::record`].
#[derive(Debug, Clone)]
pub struct RecordScan {
    pub student_id: DbId,
    pub token: String,
    pub client_request_id: Uuid,
    pub device_info: Option<serde_json::Value>,
    pub now: Timestamp,
    /// Required scans per day when the group has no requirement row.
    pub default_required: i32,
}

/// What the recorder decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Accepted(ScanReceipt),
    Rejected(ScanRejection),
}
