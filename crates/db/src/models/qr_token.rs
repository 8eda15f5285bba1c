//! QR token entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vocatrack_core::attendance::TokenSnapshot;
use vocatrack_core::qr_token::TokenStatus;
use vocatrack_core::types::{DbId, Timestamp};

/// A row from the `qr_tokens` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QrToken {
    pub id: DbId,
    pub token: String,
    pub group_id: DbId,
    pub mentor_id: Option<DbId>,
    pub label: Option<String>,
    pub points_per_scan: i32,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QrToken {
    pub fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            group_id: self.group_id,
            expires_at: self.expires_at,
            revoked_at: self.revoked_at,
        }
    }

    pub fn status(&self, now: Timestamp) -> TokenStatus {
        TokenStatus::evaluate(self.expires_at, self.revoked_at, now)
    }
}

/// Insert DTO. The token string and expiry are resolved by the caller.
#[derive(Debug, Clone)]
pub struct CreateQrToken {
    pub token: String,
    pub group_id: DbId,
    pub mentor_id: Option<DbId>,
    pub label: Option<String>,
    pub points_per_scan: i32,
    pub expires_at: Timestamp,
}
