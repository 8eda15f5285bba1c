//! Repository for the `academic_sessions` table.

use sqlx::PgPool;
use vocatrack_core::types::DbId;

use crate::models::academic_session::{
    AcademicSession, CreateAcademicSession, UpdateAcademicSession,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, starts_at, ends_at, active, created_at, updated_at";

/// Advisory lock key serializing session activation.
const ACTIVATION_LOCK_KEY: i64 = 0x5E55_1011;

/// Provides CRUD and activation operations for academic sessions.
pub struct AcademicSessionRepo;

impl AcademicSessionRepo {
    /// Insert a new, inactive session.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAcademicSession,
    ) -> Result<AcademicSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO academic_sessions (name, starts_at, ends_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AcademicSession>(&query)
            .bind(input.name.trim())
            .bind(input.starts_at)
            .bind(input.ends_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AcademicSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM academic_sessions WHERE id = $1");
        sqlx::query_as::<_, AcademicSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List sessions, most recent start first.
    pub async fn list(pool: &PgPool) -> Result<Vec<AcademicSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM academic_sessions ORDER BY starts_at DESC, id DESC"
        );
        sqlx::query_as::<_, AcademicSession>(&query)
            .fetch_all(pool)
            .await
    }

    /// The row flagged active, if any.
    pub async fn find_active(pool: &PgPool) -> Result<Option<AcademicSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM academic_sessions WHERE active");
        sqlx::query_as::<_, AcademicSession>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Update a session. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAcademicSession,
    ) -> Result<Option<AcademicSession>, sqlx::Error> {
        let query = format!(
            "UPDATE academic_sessions SET
                name = COALESCE($2, name),
                starts_at = COALESCE($3, starts_at),
                ends_at = COALESCE($4, ends_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AcademicSession>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.starts_at)
            .bind(input.ends_at)
            .fetch_optional(pool)
            .await
    }

    /// Delete a session. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM academic_sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Make `id` the only active session.
    ///
    /// Deactivation of the previous session and activation of `id` commit
    /// together, so no reader ever observes zero or two active sessions.
    /// Returns `None` if the session does not exist.
    pub async fn start(pool: &PgPool, id: DbId) -> Result<Option<AcademicSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ACTIVATION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let exists: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM academic_sessions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let deactivated = sqlx::query(
            "UPDATE academic_sessions SET active = false WHERE active AND id <> $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE academic_sessions SET active = true WHERE id = $1 RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, AcademicSession>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            session_id = id,
            deactivated = deactivated.rows_affected(),
            "Academic session started"
        );
        Ok(Some(session))
    }

    /// Clear `active` on `id`. Other sessions are untouched.
    pub async fn end(pool: &PgPool, id: DbId) -> Result<Option<AcademicSession>, sqlx::Error> {
        let query = format!(
            "UPDATE academic_sessions SET active = false WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AcademicSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
