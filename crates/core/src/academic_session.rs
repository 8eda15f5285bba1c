//! Academic session rules.
//!
//! At most one session is active at a time. The database enforces this with
//! a partial unique index and `start` swaps the active flag in a single
//! transaction; this module resolves which session the dashboards treat as
//! current.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Longest session name accepted.
pub const MAX_NAME_LENGTH: usize = 100;

/// The fields needed to resolve the current session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionWindow {
    pub id: DbId,
    pub active: bool,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

/// Resolve the current session.
///
/// The first session flagged `active` wins. Without one, falls back to the
/// first session whose `[starts_at, ends_at]` window contains `now`.
pub fn resolve_active_session(sessions: &[SessionWindow], now: Timestamp) -> Option<DbId> {
    sessions
        .iter()
        .find(|s| s.active)
        .or_else(|| {
            sessions
                .iter()
                .find(|s| s.starts_at <= now && now <= s.ends_at)
        })
        .map(|s| s.id)
}

pub fn validate_session_window(starts_at: Timestamp, ends_at: Timestamp) -> Result<(), String> {
    if ends_at <= starts_at {
        return Err("ends_at must be after starts_at".to_string());
    }
    Ok(())
}

pub fn validate_session_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Session name must not be empty".to_string());
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(format!(
            "Session name must be at most {MAX_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn window(id: DbId, active: bool, start_offset_days: i64, len_days: i64) -> SessionWindow {
        let starts_at = Utc::now() + Duration::days(start_offset_days);
        SessionWindow {
            id,
            active,
            starts_at,
            ends_at: starts_at + Duration::days(len_days),
        }
    }

    #[test]
    fn active_flag_wins_over_date_range() {
        let sessions = vec![window(1, false, -10, 30), window(2, true, 100, 30)];
        assert_eq!(resolve_active_session(&sessions, Utc::now()), Some(2));
    }

    #[test]
    fn falls_back_to_date_range() {
        let sessions = vec![window(1, false, -100, 30), window(2, false, -10, 30)];
        assert_eq!(resolve_active_session(&sessions, Utc::now()), Some(2));
    }

    #[test]
    fn no_match_yields_none() {
        let sessions = vec![window(1, false, 10, 30)];
        assert_eq!(resolve_active_session(&sessions, Utc::now()), None);
        assert_eq!(resolve_active_session(&[], Utc::now()), None);
    }

    #[test]
    fn window_must_have_positive_length() {
        let now = Utc::now();
        assert!(validate_session_window(now, now).is_err());
        assert!(validate_session_window(now, now + Duration::days(1)).is_ok());
    }

    #[test]
    fn name_must_be_present_and_bounded() {
        assert!(validate_session_name("  ").is_err());
        assert!(validate_session_name("2026/2027").is_ok());
        assert!(validate_session_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }
}
