//! Error handling for Lottobot
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the Lottobot application
#[derive(Error, Debug)]
pub enum LottoBotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Lottery not found: {lottery_id}")]
    LotteryNotFound { lottery_id: Uuid },

    #[error("User not found: {telegram_id}")]
    UserNotFound { telegram_id: i64 },

    #[error("Winner not found: {winner_id}")]
    WinnerNotFound { winner_id: Uuid },

    #[error("Invalid lottery state: expected {expected}, found {found}")]
    InvalidState { expected: String, found: String },

    #[error("User {telegram_id} is blacklisted: {reason}")]
    Blacklisted { telegram_id: i64, reason: String },

    #[error("User {telegram_id} already joined lottery {lottery_id}")]
    AlreadyJoined { telegram_id: i64, lottery_id: Uuid },

    #[error("Daily join limit of {limit} reached")]
    JoinLimitReached { limit: u32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for Lottobot operations
pub type Result<T> = std::result::Result<T, LottoBotError>;

impl LottoBotError {
    /// Check if the error is safe to retry (transient I/O)
    pub fn is_recoverable(&self) -> bool {
        match self {
            LottoBotError::Database(_) => true,
            LottoBotError::Migration(_) => false,
            LottoBotError::Telegram(_) => true,
            LottoBotError::Config(_) => false,
            LottoBotError::PermissionDenied(_) => false,
            LottoBotError::LotteryNotFound { .. } => false,
            LottoBotError::UserNotFound { .. } => false,
            LottoBotError::WinnerNotFound { .. } => false,
            LottoBotError::InvalidState { .. } => false,
            LottoBotError::Blacklisted { .. } => false,
            LottoBotError::AlreadyJoined { .. } => false,
            LottoBotError::JoinLimitReached { .. } => false,
            LottoBotError::Serialization(_) => false,
            LottoBotError::Io(_) => true,
            LottoBotError::Jwt(_) => false,
            LottoBotError::Authentication(_) => false,
            LottoBotError::InvalidInput(_) => false,
            LottoBotError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LottoBotError::Database(_) => ErrorSeverity::Critical,
            LottoBotError::Migration(_) => ErrorSeverity::Critical,
            LottoBotError::Config(_) => ErrorSeverity::Critical,
            LottoBotError::PermissionDenied(_) => ErrorSeverity::Warning,
            LottoBotError::Authentication(_) => ErrorSeverity::Warning,
            LottoBotError::Blacklisted { .. } => ErrorSeverity::Warning,
            LottoBotError::JoinLimitReached { .. } => ErrorSeverity::Info,
            LottoBotError::AlreadyJoined { .. } => ErrorSeverity::Info,
            LottoBotError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classes_are_recoverable() {
        let err = LottoBotError::ServiceUnavailable("bot api".to_string());
        assert!(err.is_recoverable());

        let err = LottoBotError::InvalidState {
            expected: "active".to_string(),
            found: "drawn".to_string(),
        };
        assert!(!err.is_recoverable());

        let err = LottoBotError::PermissionDenied("not the creator".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_severity_ordering_for_domain_errors() {
        let err = LottoBotError::JoinLimitReached { limit: 3 };
        assert_eq!(err.severity(), ErrorSeverity::Info);

        let err = LottoBotError::Config("missing bot token".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
