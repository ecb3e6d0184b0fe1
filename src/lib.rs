//! Lottobot
//!
//! A Telegram bot platform for running lotteries: a draw engine with
//! manual and scheduled triggers, winner notifications, announcement
//! publishing with duplicate-push warnings, and a small HTTP API for the
//! mini-app and cron callers.

pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{LottoBotError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
