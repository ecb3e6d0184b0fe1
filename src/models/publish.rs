//! Lottery publish history model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One push of a lottery announcement to a chat. Advisory only: the latest
/// row per (lottery, chat) is used to warn against duplicate pushes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LotteryPublish {
    pub id: i64,
    pub lottery_id: Uuid,
    pub chat_id: i64,
    pub chat_title: String,
    pub message_id: Option<i32>,
    pub published_by: i64,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPublishRecord {
    pub lottery_id: Uuid,
    pub chat_id: i64,
    pub chat_title: String,
    pub message_id: Option<i32>,
    pub published_by: i64,
}
