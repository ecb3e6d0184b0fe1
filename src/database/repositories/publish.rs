//! Publish history repository implementation

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::publish::{LotteryPublish, NewPublishRecord};
use crate::utils::errors::LottoBotError;

const PUBLISH_COLUMNS: &str = "id, lottery_id, chat_id, chat_title, message_id, published_by, published_at";

#[derive(Debug, Clone)]
pub struct PublishRepository {
    pool: PgPool,
}

impl PublishRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a push of a lottery announcement to a chat
    pub async fn create(&self, record: NewPublishRecord) -> Result<LotteryPublish, LottoBotError> {
        let publish = sqlx::query_as::<_, LotteryPublish>(&format!(
            r#"
            INSERT INTO lottery_publishes (lottery_id, chat_id, chat_title, message_id, published_by, published_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PUBLISH_COLUMNS}
            "#
        ))
        .bind(record.lottery_id)
        .bind(record.chat_id)
        .bind(&record.chat_title)
        .bind(record.message_id)
        .bind(record.published_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(publish)
    }

    /// Most recent push of a lottery to a specific chat
    pub async fn latest_for(
        &self,
        lottery_id: Uuid,
        chat_id: i64,
    ) -> Result<Option<LotteryPublish>, LottoBotError> {
        let publish = sqlx::query_as::<_, LotteryPublish>(&format!(
            "SELECT {PUBLISH_COLUMNS} FROM lottery_publishes WHERE lottery_id = $1 AND chat_id = $2 ORDER BY published_at DESC LIMIT 1"
        ))
        .bind(lottery_id)
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(publish)
    }

    /// All chats a lottery was pushed to
    pub async fn list_for_lottery(&self, lottery_id: Uuid) -> Result<Vec<LotteryPublish>, LottoBotError> {
        let publishes = sqlx::query_as::<_, LotteryPublish>(&format!(
            "SELECT {PUBLISH_COLUMNS} FROM lottery_publishes WHERE lottery_id = $1 ORDER BY published_at ASC"
        ))
        .bind(lottery_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(publishes)
    }
}
