//! Expiry reminder models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Single-row reminder configuration
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReminderSetting {
    pub id: i32,
    pub enabled: bool,
    /// Comma-separated day offsets, e.g. "7,3,1"
    pub reminder_days: String,
    pub vip_template: Option<String>,
    pub admin_template: Option<String>,
    pub user_template: Option<String>,
}

/// Send-once log: one row per (user, audience, days_left)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReminderLog {
    pub id: i64,
    pub telegram_id: i64,
    pub kind: String,
    pub days_left: i32,
    pub sent_at: DateTime<Utc>,
}

/// Which entitlement a reminder is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Vip,
    Admin,
    Paid,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Vip => "vip",
            ReminderKind::Admin => "admin",
            ReminderKind::Paid => "paid",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReminderKind::Vip => "VIP",
            ReminderKind::Admin => "admin",
            ReminderKind::Paid => "membership",
        }
    }
}

impl ReminderSetting {
    /// Parse the configured day offsets, skipping malformed entries
    pub fn day_offsets(&self) -> Vec<i64> {
        self.reminder_days
            .split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .filter(|days| *days >= 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_offsets_parsing() {
        let setting = ReminderSetting {
            id: 1,
            enabled: true,
            reminder_days: "7, 3,1,oops,-2".to_string(),
            vip_template: None,
            admin_template: None,
            user_template: None,
        };
        assert_eq!(setting.day_offsets(), vec![7, 3, 1]);
    }
}
