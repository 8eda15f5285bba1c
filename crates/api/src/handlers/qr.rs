//! Handlers for QR token issuance and revocation.
//!
//! A mentor issues tokens for a group they lead. Each response carries the
//! signed `payload` to encode in the printed or displayed QR code.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use vocatrack_core::error::CoreError;
use vocatrack_core::qr_token::{
    generate_token, resolve_validity, sign_payload, validate_bulk_count, validate_points_per_scan,
    TokenStatus, DEFAULT_POINTS_PER_SCAN,
};
use vocatrack_core::types::{DbId, Timestamp};
use vocatrack_db::models::qr_token::{CreateQrToken, QrToken};
use vocatrack_db::repositories::QrTokenRepo;

use super::groups::load_managed_group;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireMentor;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_LABEL_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /qr/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub group_id: DbId,
    pub label: Option<String>,
    pub points_per_scan: Option<i32>,
    pub valid_for_minutes: Option<i64>,
}

/// Request body for `POST /qr/generate-bulk`.
#[derive(Debug, Deserialize)]
pub struct GenerateBulkRequest {
    pub group_id: DbId,
    pub count: usize,
    /// Labels become `"{label_prefix} {n}"`.
    pub label_prefix: Option<String>,
    pub points_per_scan: Option<i32>,
    pub valid_for_minutes: Option<i64>,
}

/// Query parameters for `GET /qr/tokens`.
#[derive(Debug, Deserialize)]
pub struct TokenListParams {
    pub group_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct QrTokenResponse {
    #[serde(flatten)]
    pub token: QrToken,
    pub status: TokenStatus,
    /// Signed QR payload.
    pub payload: String,
}

impl QrTokenResponse {
    fn build(token: QrToken, secret: &str, now: Timestamp) -> Self {
        Self {
            status: token.status(now),
            payload: sign_payload(secret, &token.token),
            token,
        }
    }
}

/// Validated issuance settings shared by single and bulk generation.
struct Issue {
    points_per_scan: i32,
    expires_at: Timestamp,
}

fn resolve_issue(
    state: &AppState,
    points_per_scan: Option<i32>,
    valid_for_minutes: Option<i64>,
    now: Timestamp,
) -> AppResult<Issue> {
    let points = points_per_scan.unwrap_or(DEFAULT_POINTS_PER_SCAN);
    validate_points_per_scan(points).map_err(|m| AppError::Core(CoreError::Validation(m)))?;

    let validity = resolve_validity(
        valid_for_minutes,
        state.config.qr.default_validity_mins,
        state.config.qr.max_validity_mins,
    )
    .map_err(|m| AppError::Core(CoreError::Validation(m)))?;

    Ok(Issue {
        points_per_scan: points,
        expires_at: now + validity,
    })
}

fn clean_label(label: Option<String>) -> AppResult<Option<String>> {
    let label = label.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
    if label.as_ref().is_some_and(|l| l.len() > MAX_LABEL_LENGTH) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "label must be at most {MAX_LABEL_LENGTH} characters"
        ))));
    }
    Ok(label)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/qr/generate
pub async fn generate(
    State(state): State<AppState>,
    RequireMentor(user): RequireMentor,
    Json(input): Json<GenerateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<QrTokenResponse>>)> {
    load_managed_group(&state, &user, input.group_id).await?;
    let now = Utc::now();
    let issue = resolve_issue(&state, input.points_per_scan, input.valid_for_minutes, now)?;

    let token = QrTokenRepo::create(
        &state.pool,
        &CreateQrToken {
            token: generate_token(),
            group_id: input.group_id,
            mentor_id: Some(user.user_id),
            label: clean_label(input.label)?,
            points_per_scan: issue.points_per_scan,
            expires_at: issue.expires_at,
        },
    )
    .await?;

    tracing::info!(
        qr_token_id = token.id,
        group_id = input.group_id,
        mentor_id = user.user_id,
        expires_at = %token.expires_at,
        "QR token issued"
    );
    let response = QrTokenResponse::build(token, &state.config.qr.signing_secret, now);
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/v1/qr/generate-bulk
///
/// Issues every token or none.
pub async fn generate_bulk(
    State(state): State<AppState>,
    RequireMentor(user): RequireMentor,
    Json(input): Json<GenerateBulkRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<QrTokenResponse>>>)> {
    validate_bulk_count(input.count).map_err(|m| AppError::Core(CoreError::Validation(m)))?;
    load_managed_group(&state, &user, input.group_id).await?;
    let now = Utc::now();
    let issue = resolve_issue(&state, input.points_per_scan, input.valid_for_minutes, now)?;
    let prefix = clean_label(input.label_prefix)?;

    let inputs: Vec<CreateQrToken> = (1..=input.count)
        .map(|n| CreateQrToken {
            token: generate_token(),
            group_id: input.group_id,
            mentor_id: Some(user.user_id),
            label: prefix.as_ref().map(|p| format!("{p} {n}")),
            points_per_scan: issue.points_per_scan,
            expires_at: issue.expires_at,
        })
        .collect();
    let tokens = QrTokenRepo::create_many(&state.pool, &inputs).await?;

    tracing::info!(
        group_id = input.group_id,
        mentor_id = user.user_id,
        count = tokens.len(),
        "QR tokens issued in bulk"
    );
    let secret = &state.config.qr.signing_secret;
    let data = tokens
        .into_iter()
        .map(|t| QrTokenResponse::build(t, secret, now))
        .collect();
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/qr/tokens?group_id=
pub async fn list(
    State(state): State<AppState>,
    RequireMentor(user): RequireMentor,
    Query(params): Query<TokenListParams>,
) -> AppResult<Json<DataResponse<Vec<QrTokenResponse>>>> {
    load_managed_group(&state, &user, params.group_id).await?;
    let now = Utc::now();
    let secret = &state.config.qr.signing_secret;
    let data = QrTokenRepo::list_by_group(&state.pool, params.group_id)
        .await?
        .into_iter()
        .map(|t| QrTokenResponse::build(t, secret, now))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/qr/tokens/{id}/revoke
///
/// Revoking an already revoked token is a no-op that returns the token.
pub async fn revoke(
    State(state): State<AppState>,
    RequireMentor(user): RequireMentor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<QrTokenResponse>>> {
    let not_found = || AppError::Core(CoreError::NotFound { entity: "QrToken", id });
    let token = QrTokenRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    load_managed_group(&state, &user, token.group_id).await?;

    let now = Utc::now();
    let revoked = QrTokenRepo::revoke(&state.pool, id, now)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(qr_token_id = id, mentor_id = user.user_id, "QR token revoked");
    let response = QrTokenResponse::build(revoked, &state.config.qr.signing_secret, now);
    Ok(Json(DataResponse { data: response }))
}
