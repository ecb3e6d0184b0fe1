//! Lottery and prize models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lottery {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub created_by: i64,
    pub creator_username: Option<String>,
    pub draw_type: String,
    pub draw_time: Option<DateTime<Utc>>,
    pub draw_count: Option<i32>,
    pub allow_repeat_winners: bool,
    pub require_username: bool,
    pub created_at: DateTime<Utc>,
    pub drawn_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Prize {
    pub id: Uuid,
    pub lottery_id: Uuid,
    pub name: String,
    pub total: i32,
    pub remaining: i32,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLotteryRequest {
    pub title: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub creator_username: Option<String>,
    pub draw_type: DrawType,
    pub draw_time: Option<DateTime<Utc>>,
    pub draw_count: Option<i32>,
    pub allow_repeat_winners: bool,
    pub require_username: bool,
    pub prizes: Vec<NewPrize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrize {
    pub name: String,
    pub total: i32,
}

/// Lottery lifecycle, stored as text in the `status` column.
/// `active -> drawn` is a one-way transition, guarded at the database layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotteryStatus {
    Active,
    Drawn,
    Cancelled,
}

impl LotteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotteryStatus::Active => "active",
            LotteryStatus::Drawn => "drawn",
            LotteryStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<LotteryStatus> {
        match value {
            "active" => Some(LotteryStatus::Active),
            "drawn" => Some(LotteryStatus::Drawn),
            "cancelled" => Some(LotteryStatus::Cancelled),
            _ => None,
        }
    }
}

/// How a lottery is drawn: at a fixed time, or when enough users joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawType {
    Time,
    Count,
}

impl DrawType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawType::Time => "time",
            DrawType::Count => "count",
        }
    }

    pub fn parse(value: &str) -> Option<DrawType> {
        match value {
            "time" => Some(DrawType::Time),
            "count" => Some(DrawType::Count),
            _ => None,
        }
    }
}

impl Lottery {
    pub fn status(&self) -> Option<LotteryStatus> {
        LotteryStatus::parse(&self.status)
    }

    pub fn draw_type(&self) -> Option<DrawType> {
        DrawType::parse(&self.draw_type)
    }

    pub fn is_active(&self) -> bool {
        self.status() == Some(LotteryStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [LotteryStatus::Active, LotteryStatus::Drawn, LotteryStatus::Cancelled] {
            assert_eq!(LotteryStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LotteryStatus::parse("finished"), None);
    }

    #[test]
    fn test_draw_type_round_trip() {
        assert_eq!(DrawType::parse("time"), Some(DrawType::Time));
        assert_eq!(DrawType::parse("count"), Some(DrawType::Count));
        assert_eq!(DrawType::parse("manual"), None);
    }
}
