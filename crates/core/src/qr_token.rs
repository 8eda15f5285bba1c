//! QR token issuance, payload parsing, and validity rules.
//!
//! Tokens are opaque random strings. The scan client only has to recognise a
//! well-formed token inside whatever the camera decoded; the recorder decides
//! whether it is still valid.

use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::hashing::{hmac_sha256_hex, verify_hmac_sha256_hex};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of random bytes in a generated token (hex encoded to twice this).
pub const TOKEN_BYTES: usize = 32;

/// Longest token string accepted from a scanned payload.
pub const MAX_TOKEN_LENGTH: usize = 256;

/// Default points awarded per accepted scan.
pub const DEFAULT_POINTS_PER_SCAN: i32 = 1;

/// Upper bound for points awarded by a single scan.
pub const MAX_POINTS_PER_SCAN: i32 = 100;

/// Largest batch accepted by bulk generation.
pub const MAX_BULK_TOKENS: usize = 50;

/// Separator between token and signature in a signed payload.
const SIGNATURE_SEPARATOR: char = '.';

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a new random token (lowercase hex).
pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::rng().random();
    hex::encode(bytes)
}

/// Append an HMAC signature so printed codes can be checked without a lookup.
pub fn sign_payload(secret: &str, token: &str) -> String {
    let signature = hmac_sha256_hex(secret.as_bytes(), token.as_bytes());
    format!("{token}{SIGNATURE_SEPARATOR}{signature}")
}

/// Verify a payload produced by [`sign_payload`], returning the bare token.
pub fn verify_payload<'a>(secret: &str, payload: &'a str) -> Option<&'a str> {
    let (token, signature) = payload.rsplit_once(SIGNATURE_SEPARATOR)?;
    verify_hmac_sha256_hex(secret.as_bytes(), token.as_bytes(), signature).then_some(token)
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

/// Why a scanned payload could not be turned into a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("QR payload is empty")]
    Empty,
    #[error("QR payload exceeds {MAX_TOKEN_LENGTH} characters")]
    TooLong,
    #[error("QR payload contains invalid characters")]
    InvalidCharacters,
}

/// Extract the opaque token from a decoded QR payload.
///
/// Accepted shapes: a bare token, a JSON object with a `token` string field,
/// or a URL whose query string carries `token=`. A signed payload
/// (`token.signature`) is returned whole; the recorder strips the signature.
pub fn extract_token(payload: &str) -> Result<String, PayloadError> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(PayloadError::Empty);
    }

    let candidate = if trimmed.starts_with('{') {
        serde_json::from_str::<serde_json::Value>(trimmed)
            .ok()
            .and_then(|v| v.get("token").and_then(|t| t.as_str()).map(str::to_string))
            .ok_or(PayloadError::InvalidCharacters)?
    } else if let Some((_, query)) = trimmed.split_once('?') {
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix("token="))
            .map(str::to_string)
            .ok_or(PayloadError::InvalidCharacters)?
    } else {
        trimmed.to_string()
    };

    validate_token_format(&candidate)?;
    Ok(candidate)
}

/// Check a token string uses only `[A-Za-z0-9_.-]` and fits the length cap.
pub fn validate_token_format(token: &str) -> Result<(), PayloadError> {
    if token.is_empty() {
        return Err(PayloadError::Empty);
    }
    if token.len() > MAX_TOKEN_LENGTH {
        return Err(PayloadError::TooLong);
    }
    let valid = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == SIGNATURE_SEPARATOR);
    if !valid {
        return Err(PayloadError::InvalidCharacters);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validity
// ---------------------------------------------------------------------------

/// Lifecycle state of an issued token at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Valid,
    Expired,
    Revoked,
}

impl TokenStatus {
    /// A token is valid only while `now < expires_at` and it is not revoked.
    pub fn evaluate(expires_at: Timestamp, revoked_at: Option<Timestamp>, now: Timestamp) -> Self {
        if revoked_at.is_some_and(|r| r <= now) {
            Self::Revoked
        } else if now >= expires_at {
            Self::Expired
        } else {
            Self::Valid
        }
    }
}

pub fn validate_points_per_scan(points: i32) -> Result<(), String> {
    if !(1..=MAX_POINTS_PER_SCAN).contains(&points) {
        return Err(format!(
            "points_per_scan must be between 1 and {MAX_POINTS_PER_SCAN}, got {points}"
        ));
    }
    Ok(())
}

/// Resolve the validity window for a new token.
///
/// `requested_mins` falls back to `default_mins`; values outside
/// `1..=max_mins` are rejected.
pub fn resolve_validity(
    requested_mins: Option<i64>,
    default_mins: i64,
    max_mins: i64,
) -> Result<Duration, String> {
    let mins = requested_mins.unwrap_or(default_mins);
    if mins < 1 || mins > max_mins {
        return Err(format!(
            "valid_for_minutes must be between 1 and {max_mins}, got {mins}"
        ));
    }
    Ok(Duration::minutes(mins))
}

pub fn validate_bulk_count(count: usize) -> Result<(), String> {
    if count == 0 || count > MAX_BULK_TOKENS {
        return Err(format!(
            "Bulk generation accepts between 1 and {MAX_BULK_TOKENS} tokens, got {count}"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
