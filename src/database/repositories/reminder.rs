//! Reminder settings and send-log repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::reminder::{ReminderSetting, ReminderKind};
use crate::utils::errors::LottoBotError;

#[derive(Debug, Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The reminder configuration, if any has been saved
    pub async fn get_settings(&self) -> Result<Option<ReminderSetting>, LottoBotError> {
        let settings = sqlx::query_as::<_, ReminderSetting>(
            "SELECT id, enabled, reminder_days, vip_template, admin_template, user_template FROM reminder_settings ORDER BY id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Whether a reminder was already sent for this (user, audience, offset)
    pub async fn was_sent(
        &self,
        telegram_id: i64,
        kind: ReminderKind,
        days_left: i32,
    ) -> Result<bool, LottoBotError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reminder_logs WHERE telegram_id = $1 AND kind = $2 AND days_left = $3",
        )
        .bind(telegram_id)
        .bind(kind.as_str())
        .bind(days_left)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Record a sent reminder; a concurrent duplicate insert is a no-op
    pub async fn record_sent(
        &self,
        telegram_id: i64,
        kind: ReminderKind,
        days_left: i32,
    ) -> Result<(), LottoBotError> {
        sqlx::query(
            r#"
            INSERT INTO reminder_logs (telegram_id, kind, days_left, sent_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (telegram_id, kind, days_left) DO NOTHING
            "#,
        )
        .bind(telegram_id)
        .bind(kind.as_str())
        .bind(days_left)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
