//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{
    DatabasePool, LotteryRepository, ParticipantRepository, WinnerRepository, PublishRepository,
    UserRepository, BlacklistRepository, TemplateRepository, ChannelRepository, ReminderRepository,
};
use crate::models::UpsertUserRequest;
use crate::models::user::User;
use crate::utils::errors::LottoBotError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub lotteries: LotteryRepository,
    pub participants: ParticipantRepository,
    pub winners: WinnerRepository,
    pub publishes: PublishRepository,
    pub users: UserRepository,
    pub blacklist: BlacklistRepository,
    pub templates: TemplateRepository,
    pub channels: ChannelRepository,
    pub reminders: ReminderRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            lotteries: LotteryRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            winners: WinnerRepository::new(pool.clone()),
            publishes: PublishRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            blacklist: BlacklistRepository::new(pool.clone()),
            templates: TemplateRepository::new(pool.clone()),
            channels: ChannelRepository::new(pool.clone()),
            reminders: ReminderRepository::new(pool),
        }
    }

    /// Register or refresh a user from their Telegram profile
    pub async fn touch_user(
        &self,
        telegram_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<User, LottoBotError> {
        self.users
            .upsert(UpsertUserRequest {
                telegram_id,
                username,
                first_name,
                last_name,
            })
            .await
    }

    /// Aggregate platform statistics
    pub async fn get_system_stats(&self) -> Result<serde_json::Value, LottoBotError> {
        let active = self
            .lotteries
            .count_by_status(crate::models::LotteryStatus::Active)
            .await?;
        let drawn = self
            .lotteries
            .count_by_status(crate::models::LotteryStatus::Drawn)
            .await?;
        let users = self.users.count().await?;

        Ok(serde_json::json!({
            "active_lotteries": active,
            "drawn_lotteries": drawn,
            "users": users,
        }))
    }
}
