//! Blacklist model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A user barred from joining lotteries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlacklistEntry {
    pub id: i64,
    pub telegram_id: i64,
    pub reason: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlacklistRequest {
    pub telegram_id: i64,
    pub reason: String,
    pub created_by: i64,
}
