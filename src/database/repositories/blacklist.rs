//! Blacklist repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::blacklist::{BlacklistEntry, CreateBlacklistRequest};
use crate::utils::errors::LottoBotError;

#[derive(Debug, Clone)]
pub struct BlacklistRepository {
    pool: PgPool,
}

impl BlacklistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a user to the blacklist, updating the reason if already present
    pub async fn add(&self, request: CreateBlacklistRequest) -> Result<BlacklistEntry, LottoBotError> {
        let entry = sqlx::query_as::<_, BlacklistEntry>(
            r#"
            INSERT INTO blacklist (telegram_id, reason, created_by, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (telegram_id) DO UPDATE SET reason = EXCLUDED.reason
            RETURNING id, telegram_id, reason, created_by, created_at
            "#,
        )
        .bind(request.telegram_id)
        .bind(&request.reason)
        .bind(request.created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Remove a user from the blacklist
    pub async fn remove(&self, telegram_id: i64) -> Result<bool, LottoBotError> {
        let result = sqlx::query("DELETE FROM blacklist WHERE telegram_id = $1")
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Look up a user's blacklist entry
    pub async fn find(&self, telegram_id: i64) -> Result<Option<BlacklistEntry>, LottoBotError> {
        let entry = sqlx::query_as::<_, BlacklistEntry>(
            "SELECT id, telegram_id, reason, created_by, created_at FROM blacklist WHERE telegram_id = $1",
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// List all blacklist entries, newest first
    pub async fn list(&self) -> Result<Vec<BlacklistEntry>, LottoBotError> {
        let entries = sqlx::query_as::<_, BlacklistEntry>(
            "SELECT id, telegram_id, reason, created_by, created_at FROM blacklist ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
