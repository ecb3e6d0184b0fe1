//! Participant model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub lottery_id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinLotteryRequest {
    pub lottery_id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl Participant {
    pub fn display_name(&self) -> String {
        crate::utils::helpers::display_name(
            self.first_name.as_deref(),
            self.username.as_deref(),
            self.telegram_id,
        )
    }
}
