//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging helpers
//! for the Lottobot application.

use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "lottobot.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}

/// Log a draw execution with structured data
pub fn log_draw(lottery_id: uuid::Uuid, winner_count: usize, trigger: &str) {
    info!(
        lottery_id = %lottery_id,
        winner_count = winner_count,
        trigger = trigger,
        "Lottery drawn"
    );
}

/// Log a participant join
pub fn log_join(lottery_id: uuid::Uuid, telegram_id: i64) {
    info!(
        lottery_id = %lottery_id,
        telegram_id = telegram_id,
        "Participant joined lottery"
    );
}

/// Log a publish push
pub fn log_publish(lottery_id: uuid::Uuid, chat_id: i64, forced: bool) {
    info!(
        lottery_id = %lottery_id,
        chat_id = chat_id,
        forced = forced,
        "Lottery announcement published"
    );
}

/// Log notification send results
pub fn log_notification(telegram_id: i64, kind: &str, success: bool) {
    if success {
        debug!(telegram_id = telegram_id, kind = kind, "Notification sent");
    } else {
        warn!(telegram_id = telegram_id, kind = kind, "Notification send failed");
    }
}

/// Log admin/management actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        "Admin action performed"
    );
}
