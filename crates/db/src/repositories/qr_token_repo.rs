//! Repository for the `qr_tokens` table.

use sqlx::PgPool;
use vocatrack_core::types::{DbId, Timestamp};

use crate::models::qr_token::{CreateQrToken, QrToken};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, token, group_id, mentor_id, label, points_per_scan, \
                                  expires_at, revoked_at, created_at, updated_at";

/// Provides issue, lookup, and revoke operations for QR tokens.
pub struct QrTokenRepo;

impl QrTokenRepo {
    pub async fn create(pool: &PgPool, input: &CreateQrToken) -> Result<QrToken, sqlx::Error> {
        let query = insert_query();
        sqlx::query_as::<_, QrToken>(&query)
            .bind(&input.token)
            .bind(input.group_id)
            .bind(input.mentor_id)
            .bind(&input.label)
            .bind(input.points_per_scan)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Insert several tokens in one transaction. Either all are issued or none.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[CreateQrToken],
    ) -> Result<Vec<QrToken>, sqlx::Error> {
        let query = insert_query();
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let token = sqlx::query_as::<_, QrToken>(&query)
                .bind(&input.token)
                .bind(input.group_id)
                .bind(input.mentor_id)
                .bind(&input.label)
                .bind(input.points_per_scan)
                .bind(input.expires_at)
                .fetch_one(&mut *tx)
                .await?;
            created.push(token);
        }
        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<QrToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qr_tokens WHERE id = $1");
        sqlx::query_as::<_, QrToken>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<QrToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qr_tokens WHERE token = $1");
        sqlx::query_as::<_, QrToken>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// A group's tokens, newest first.
    pub async fn list_by_group(pool: &PgPool, group_id: DbId) -> Result<Vec<QrToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM qr_tokens WHERE group_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, QrToken>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    /// Revoke a token. Revoking twice keeps the first `revoked_at`.
    pub async fn revoke(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<Option<QrToken>, sqlx::Error> {
        let query = format!(
            "UPDATE qr_tokens SET revoked_at = COALESCE(revoked_at, $2)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QrToken>(&query)
            .bind(id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}

fn insert_query() -> String {
    format!(
        "INSERT INTO qr_tokens (token, group_id, mentor_id, label, points_per_scan, expires_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}"
    )
}
