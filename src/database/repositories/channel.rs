//! Announcement channel repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::channel::AnnouncementChannel;
use crate::utils::errors::LottoBotError;

#[derive(Debug, Clone)]
pub struct ChannelRepository {
    pool: PgPool,
}

impl ChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a chat as an announcement target
    pub async fn add(&self, chat_id: i64, title: &str) -> Result<AnnouncementChannel, LottoBotError> {
        let channel = sqlx::query_as::<_, AnnouncementChannel>(
            r#"
            INSERT INTO announcement_channels (chat_id, title, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (chat_id) DO UPDATE SET title = EXCLUDED.title
            RETURNING id, chat_id, title, created_at
            "#,
        )
        .bind(chat_id)
        .bind(title)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(channel)
    }

    /// Remove an announcement target
    pub async fn remove(&self, chat_id: i64) -> Result<bool, LottoBotError> {
        let result = sqlx::query("DELETE FROM announcement_channels WHERE chat_id = $1")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List announcement targets, newest first
    pub async fn list(&self) -> Result<Vec<AnnouncementChannel>, LottoBotError> {
        let channels = sqlx::query_as::<_, AnnouncementChannel>(
            "SELECT id, chat_id, title, created_at FROM announcement_channels ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }
}
