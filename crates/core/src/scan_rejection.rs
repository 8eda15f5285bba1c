//! Closed set of reasons the scan recorder may give for declining a scan.
//!
//! Clients branch on [`ScanRejection::as_str`] codes, never on message text.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const REASON_EXPIRED_TOKEN: &str = "expired_token";
pub const REASON_ALREADY_SCANNED: &str = "already_scanned";
pub const REASON_WRONG_GROUP: &str = "wrong_group";
pub const REASON_NOT_ASSIGNED: &str = "not_assigned";
pub const REASON_SESSION_INACTIVE: &str = "session_inactive";
pub const REASON_INVALID_TOKEN: &str = "invalid_token";

/// All valid reason codes.
pub const VALID_REASONS: &[&str] = &[
    REASON_EXPIRED_TOKEN,
    REASON_ALREADY_SCANNED,
    REASON_WRONG_GROUP,
    REASON_NOT_ASSIGNED,
    REASON_SESSION_INACTIVE,
    REASON_INVALID_TOKEN,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ScanRejection {
    /// The token's validity window has passed.
    ExpiredToken,
    /// The student already scanned this token, or today's requirement is complete.
    AlreadyScanned,
    /// The token belongs to a different group than the student's enrollment.
    WrongGroup,
    /// The student has no enrollment in `assigned` or `active` status.
    NotAssigned,
    /// No academic session is currently running.
    SessionInactive,
    /// The token is unknown or was revoked by its mentor.
    InvalidToken,
}

impl ScanRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExpiredToken => REASON_EXPIRED_TOKEN,
            Self::AlreadyScanned => REASON_ALREADY_SCANNED,
            Self::WrongGroup => REASON_WRONG_GROUP,
            Self::NotAssigned => REASON_NOT_ASSIGNED,
            Self::SessionInactive => REASON_SESSION_INACTIVE,
            Self::InvalidToken => REASON_INVALID_TOKEN,
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            REASON_EXPIRED_TOKEN => Ok(Self::ExpiredToken),
            REASON_ALREADY_SCANNED => Ok(Self::AlreadyScanned),
            REASON_WRONG_GROUP => Ok(Self::WrongGroup),
            REASON_NOT_ASSIGNED => Ok(Self::NotAssigned),
            REASON_SESSION_INACTIVE => Ok(Self::SessionInactive),
            REASON_INVALID_TOKEN => Ok(Self::InvalidToken),
            _ => Err(format!(
                "Invalid scan rejection reason '{s}'. Must be one of: {}",
                VALID_REASONS.join(", ")
            )),
        }
    }

    /// Guidance shown to the student for this reason.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ExpiredToken => "This QR code has expired. Ask your mentor for a new one.",
            Self::AlreadyScanned => "You have already recorded this scan.",
            Self::WrongGroup => "This QR code belongs to a different group.",
            Self::NotAssigned => "You must be assigned to a group before scanning.",
            Self::SessionInactive => "There is no active academic session right now.",
            Self::InvalidToken => "This QR code is not valid.",
        }
    }

    /// Whether scanning a different code could succeed.
    ///
    /// `not_assigned` and `session_inactive` depend on account state, so a
    /// rescan will not help until an administrator acts.
    pub fn is_retryable_by_rescan(&self) -> bool {
        !matches!(self, Self::NotAssigned | Self::SessionInactive)
    }
}

impl std::fmt::Display for ScanRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
