//! Helper functions and utilities
//!
//! Common helper functions used throughout the application.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Short human-facing serial for a lottery id (first 8 hex chars of the UUID)
pub fn short_sn(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Deep link that opens the bot with a start payload
pub fn lottery_deep_link(bot_username: &str, lottery_id: Uuid) -> String {
    format!("https://t.me/{}?start=lottery_{}", bot_username, lottery_id)
}

/// Display name for a Telegram user, preferring first name, then username, then id
pub fn display_name(first_name: Option<&str>, username: Option<&str>, telegram_id: i64) -> String {
    if let Some(name) = first_name {
        if !name.is_empty() {
            return name.to_string();
        }
    }
    if let Some(name) = username {
        if !name.is_empty() {
            return format!("@{name}");
        }
    }
    telegram_id.to_string()
}

/// Truncate text to a maximum length with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sn_is_eight_chars() {
        let id = Uuid::new_v4();
        let sn = short_sn(id);
        assert_eq!(sn.len(), 8);
        assert!(id.simple().to_string().starts_with(&sn));
    }

    #[test]
    fn test_display_name_preference_order() {
        assert_eq!(display_name(Some("Ann"), Some("ann42"), 7), "Ann");
        assert_eq!(display_name(None, Some("ann42"), 7), "@ann42");
        assert_eq!(display_name(None, None, 7), "7");
        assert_eq!(display_name(Some(""), None, 7), "7");
    }

    #[test]
    fn test_lottery_deep_link() {
        let id = Uuid::new_v4();
        let link = lottery_deep_link("lottobot", id);
        assert!(link.starts_with("https://t.me/lottobot?start=lottery_"));
        assert!(link.ends_with(&id.to_string()));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("0123456789", 8), "01234...");
    }
}
