//! Announcement channel model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A chat/channel that new lotteries are automatically announced to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnnouncementChannel {
    pub id: i64,
    pub chat_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
