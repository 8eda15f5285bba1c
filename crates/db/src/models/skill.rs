//! Skill entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vocatrack_core::types::{DbId, Timestamp};

/// A row from the `skills` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Skill {
    pub id: DbId,
    pub academic_session_id: DbId,
    pub title: String,
    pub description: Option<String>,
    /// Fee in the currency's minor unit.
    pub price_minor: i64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkill {
    pub academic_session_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub price_minor: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSkill {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_minor: Option<i64>,
    pub is_active: Option<bool>,
}
