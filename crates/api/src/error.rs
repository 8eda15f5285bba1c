//! HTTP error type shared by every handler.
//!
//! Every failure renders as `{"error": <message>, "code": <CODE>}`. Scan
//! rejections add `"reason"` with the rejection's wire name so the scanner
//! can show the matching message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vocatrack_core::error::CoreError;
use vocatrack_core::scan_rejection::ScanRejection;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<ScanRejection> for AppError {
    fn from(reason: ScanRejection) -> Self {
        AppError::Core(CoreError::ScanRejected(reason))
    }
}

/// What a failure looks like on the wire.
struct Rendered {
    status: StatusCode,
    code: &'static str,
    message: String,
    reason: Option<&'static str>,
}

impl Rendered {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            reason: None,
        }
    }

    /// 500 with the detail kept in the log only.
    fn hidden(detail: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Request failed with an internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl AppError {
    fn render(&self) -> Rendered {
        match self {
            AppError::Core(core) => render_core(core),
            AppError::Database(err) => render_sqlx(err),
            AppError::BadRequest(msg) => Rendered::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => Rendered::hidden(msg),
        }
    }
}

fn render_core(err: &CoreError) -> Rendered {
    match err {
        CoreError::NotFound { entity, id } => Rendered::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => {
            Rendered::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
        }
        CoreError::Conflict(msg) => Rendered::new(StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Unauthorized(msg) => Rendered::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Forbidden(msg) => Rendered::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg),
        CoreError::ScanRejected(rejection) => Rendered {
            reason: Some(rejection.as_str()),
            ..Rendered::new(
                scan_rejection_status(*rejection),
                "SCAN_REJECTED",
                rejection.user_message(),
            )
        },
        CoreError::Internal(msg) => Rendered::hidden(msg),
    }
}

/// `already_scanned` is 409, every other rejection 422.
fn scan_rejection_status(reason: ScanRejection) -> StatusCode {
    match reason {
        ScanRejection::AlreadyScanned => StatusCode::CONFLICT,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Constraint names follow the migrations: `uq_*` unique, `ck_*` check.
/// Unique and foreign-key violations are 409, check violations 400, a
/// missing row 404. Anything else is hidden behind a 500.
fn render_sqlx(err: &sqlx::Error) -> Rendered {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return Rendered::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => db_err,
        other => return Rendered::hidden(other),
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        Some("23505") if constraint.starts_with("uq_") => Rendered::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        Some("23503") => Rendered::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Operation violates foreign key constraint: {constraint}"),
        ),
        Some("23514") if constraint.starts_with("ck_") => Rendered::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value violates check constraint: {constraint}"),
        ),
        _ => Rendered::hidden(db_err),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Rendered {
            status,
            code,
            message,
            reason,
        } = self.render();

        let mut body = json!({ "error": message, "code": code });
        if let Some(reason) = reason {
            body["reason"] = json!(reason);
        }
        (status, axum::Json(body)).into_response()
    }
}
