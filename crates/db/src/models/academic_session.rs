//! Academic session entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vocatrack_core::academic_session::SessionWindow;
use vocatrack_core::types::{DbId, Timestamp};

/// A row from the `academic_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AcademicSession {
    pub id: DbId,
    pub name: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AcademicSession {
    pub fn window(&self) -> SessionWindow {
        SessionWindow {
            id: self.id,
            active: self.active,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        }
    }
}

/// DTO for creating a session. New sessions start inactive.
#[derive(Debug, Deserialize)]
pub struct CreateAcademicSession {
    pub name: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

/// DTO for updating a session. `active` is changed only through start/end.
#[derive(Debug, Deserialize)]
pub struct UpdateAcademicSession {
    pub name: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
}
