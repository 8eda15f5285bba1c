//! Handlers for scan submission and the student's scan history.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use vocatrack_core::error::CoreError;
use vocatrack_core::qr_token::{extract_token, verify_payload};
use vocatrack_core::scan_flow::ScanReceipt;
use vocatrack_core::scan_rejection::ScanRejection;
use vocatrack_core::types::DbId;
use vocatrack_db::models::scan_event::{RecordOutcome, RecordScan, ScanHistoryEntry};
use vocatrack_db::repositories::ScanEventRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStudent;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /scans`.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// The decoded QR payload: a bare or signed token, `{"token": ...}` JSON,
    /// or a URL carrying `?token=`.
    pub token: String,
    /// Idempotency key. Resubmitting the same key returns the original receipt.
    pub client_request_id: Uuid,
    /// Optional; must match the caller when present.
    pub student_id: Option<DbId>,
    pub device_info: Option<serde_json::Value>,
}

/// Resolve the bare token from a payload, checking the signature if present.
fn resolve_token(payload: &str, secret: &str) -> Result<String, ScanRejection> {
    let token = extract_token(payload).map_err(|_| ScanRejection::InvalidToken)?;
    if !token.contains('.') {
        return Ok(token);
    }
    verify_payload(secret, &token)
        .map(str::to_string)
        .ok_or(ScanRejection::InvalidToken)
}

/// POST /api/v1/scans
///
/// 201 with a receipt for a new scan, 200 with `replayed: true` for a
/// resubmitted `client_request_id`, or a scan rejection carrying `reason`.
pub async fn submit(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Json(input): Json<ScanRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ScanReceipt>>)> {
    if input.student_id.is_some_and(|id| id != student.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Scans can only be submitted for yourself".into(),
        )));
    }

    let token = resolve_token(&input.token, &state.config.qr.signing_secret)?;

    let outcome = ScanEventRepo::record(
        &state.pool,
        &RecordScan {
            student_id: student.user_id,
            token,
            client_request_id: input.client_request_id,
            device_info: input.device_info,
            now: Utc::now(),
            default_required: state.config.attendance.default_required_scans,
        },
    )
    .await?;

    match outcome {
        RecordOutcome::Accepted(receipt) => {
            let status = if receipt.replayed {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            Ok((status, Json(DataResponse { data: receipt })))
        }
        // The recorder has already logged the rejection.
        RecordOutcome::Rejected(reason) => Err(reason.into()),
    }
}

/// GET /api/v1/scans/history
pub async fn history(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ScanHistoryEntry>>>> {
    let entries =
        ScanEventRepo::history_for_student(&state.pool, student.user_id, page.limit(), page.offset())
            .await?;
    Ok(Json(DataResponse { data: entries }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocatrack_core::qr_token::sign_payload;

    const SECRET: &str = "qr-secret";

    #[test]
    fn bare_token_passes_through() {
        assert_eq!(resolve_token("  abc123  ", SECRET).as_deref(), Ok("abc123"));
    }

    #[test]
    fn signed_token_is_verified_and_stripped() {
        let payload = sign_payload(SECRET, "abc123");
        assert_eq!(resolve_token(&payload, SECRET).as_deref(), Ok("abc123"));
        assert_eq!(
            resolve_token(&payload, "other-secret"),
            Err(ScanRejection::InvalidToken)
        );
    }

    #[test]
    fn json_and_url_payloads() {
        assert_eq!(
            resolve_token(r#"{"token":"abc123"}"#, SECRET).as_deref(),
            Ok("abc123")
        );
        assert_eq!(
            resolve_token("https://vocatrack.example/scan?token=abc123", SECRET).as_deref(),
            Ok("abc123")
        );
    }

    #[test]
    fn malformed_payload_is_invalid_token() {
        assert_eq!(resolve_token("   ", SECRET), Err(ScanRejection::InvalidToken));
        assert_eq!(resolve_token("a b c", SECRET), Err(ScanRejection::InvalidToken));
    }
}
