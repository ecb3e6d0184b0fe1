//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{LottoBotError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_server_config(&settings.server)?;
    validate_auth_config(&settings.auth)?;
    validate_draw_config(&settings.draw)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(LottoBotError::Config("Bot token is required".to_string()));
    }

    if config.username.is_empty() {
        return Err(LottoBotError::Config("Bot username is required".to_string()));
    }

    if config.username.starts_with('@') {
        return Err(LottoBotError::Config(
            "Bot username must be configured without the leading '@'".to_string(),
        ));
    }

    if config.super_admin_id == 0 {
        return Err(LottoBotError::Config("Super admin ID must be configured".to_string()));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(LottoBotError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(LottoBotError::Config("Max connections must be greater than 0".to_string()));
    }

    if config.min_connections > config.max_connections {
        return Err(LottoBotError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.bind_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(LottoBotError::Config(format!(
            "Invalid server bind address: {}",
            config.bind_addr
        )));
    }

    if config.cron_secret.len() < 16 {
        return Err(LottoBotError::Config(
            "Cron secret must be at least 16 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate auth configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < 32 {
        return Err(LottoBotError::Config(
            "JWT secret must be at least 32 characters".to_string(),
        ));
    }

    if config.session_ttl_minutes <= 0 {
        return Err(LottoBotError::Config(
            "Session TTL must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate draw configuration
fn validate_draw_config(config: &super::DrawConfig) -> Result<()> {
    if config.join_limit_enabled && config.daily_join_limit == 0 {
        return Err(LottoBotError::Config(
            "Daily join limit must be greater than 0 when enabled".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(LottoBotError::Config("Log level is required".to_string()));
    }

    if config.file_path.is_empty() {
        return Err(LottoBotError::Config("Log file path is required".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "123456:ABC-token".to_string();
        settings.bot.super_admin_id = 10;
        settings.server.cron_secret = "0123456789abcdef0123".to_string();
        settings.auth.jwt_secret = "0123456789abcdef0123456789abcdef".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_bot_token_fails() {
        let mut settings = valid_settings();
        settings.bot.token = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_short_cron_secret_fails() {
        let mut settings = valid_settings();
        settings.server.cron_secret = "short".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_join_limit_zero_fails_when_enabled() {
        let mut settings = valid_settings();
        settings.draw.join_limit_enabled = true;
        settings.draw.daily_join_limit = 0;
        assert!(validate_settings(&settings).is_err());
    }
}
