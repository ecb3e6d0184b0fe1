//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod draw;
pub mod lottery;
pub mod notification;
pub mod permissions;
pub mod publish;
pub mod reminder;
pub mod templates;

// Re-export commonly used services
pub use auth::{AuthService, SessionClaims, TelegramUser};
pub use draw::{DrawEngine, DrawOutcome, select_winners};
pub use lottery::{JoinOutcome, LotteryService};
pub use notification::NotificationService;
pub use permissions::{can_access_feature, subscription_valid, Feature};
pub use publish::{PublishOutcome, PublishService};
pub use reminder::{ReminderRunSummary, ReminderService};
pub use templates::{TemplateContext, TemplateService};

use teloxide::Bot;
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub settings: Settings,
    pub db: DatabaseService,
    pub auth: AuthService,
    pub templates: TemplateService,
    pub notifier: NotificationService,
    pub publisher: PublishService,
    pub draw: DrawEngine,
    pub lotteries: LotteryService,
    pub reminders: ReminderService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(bot: Bot, settings: Settings, db: DatabaseService) -> Result<Self> {
        let auth = AuthService::new(settings.clone());
        let templates = TemplateService::new(db.clone());
        let notifier = NotificationService::new(bot.clone(), db.clone(), templates.clone(), settings.clone());
        let publisher = PublishService::new(bot, db.clone(), templates.clone(), settings.clone());
        let draw = DrawEngine::new(db.clone(), notifier.clone());
        let lotteries = LotteryService::new(
            db.clone(),
            draw.clone(),
            publisher.clone(),
            notifier.clone(),
            settings.clone(),
        );
        let reminders = ReminderService::new(db.clone(), notifier.clone());

        Ok(Self {
            settings,
            db,
            auth,
            templates,
            notifier,
            publisher,
            draw,
            lotteries,
            reminders,
        })
    }
}
