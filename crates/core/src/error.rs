use crate::scan_rejection::ScanRejection;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The scan recorder declined a scan. Carries a closed reason code.
    #[error("Scan rejected: {0}")]
    ScanRejected(ScanRejection),

    #[error("Internal error: {0}")]
    Internal(String),
}
