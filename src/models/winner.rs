//! Winner model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Winner {
    pub id: Uuid,
    pub lottery_id: Uuid,
    pub prize_id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub prize_name: String,
    pub notified: bool,
    pub created_at: DateTime<Utc>,
}

/// A winner selected by the draw, not yet persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWinner {
    pub prize_id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub prize_name: String,
}

impl Winner {
    pub fn display_name(&self) -> String {
        crate::utils::helpers::display_name(
            self.first_name.as_deref(),
            self.username.as_deref(),
            self.telegram_id,
        )
    }
}
