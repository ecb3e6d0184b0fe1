//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub draw: DrawConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// Bot username without the leading `@`, used for t.me deep links
    pub username: String,
    pub super_admin_id: i64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// HTTP server configuration (health, cron and mini-app API)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Bearer secret required by the /cron/* trigger endpoints
    pub cron_secret: String,
}

/// Session token configuration for the mini-app/dashboard API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

/// Participation limits applied by the join flow
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DrawConfig {
    pub join_limit_enabled: bool,
    pub daily_join_limit: u32,
    /// VIP accounts bypass the daily limit when true
    pub vip_unlimited: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    pub max_files: u32,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("LOTTOBOT").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::LottoBotError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                username: "lottobot".to_string(),
                super_admin_id: 0,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/lottobot".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            server: ServerConfig {
                bind_addr: "0.0.0.0:8080".to_string(),
                cron_secret: String::new(),
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                session_ttl_minutes: 7 * 24 * 60,
            },
            draw: DrawConfig {
                join_limit_enabled: false,
                daily_join_limit: 3,
                vip_unlimited: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/lottobot".to_string(),
                max_files: 5,
            },
        }
    }
}
