//! Input validation helpers

use regex::Regex;
use crate::utils::errors::{LottoBotError, Result};

/// Placeholders accepted inside stored message templates
pub const KNOWN_PLACEHOLDERS: &[&str] = &[
    "lottery_sn",
    "lottery_title",
    "lottery_desc",
    "creator",
    "join_condition",
    "prize_list",
    "prize_name",
    "draw_condition",
    "draw_time",
    "participant_count",
    "lottery_link",
    "member",
    "winner_list",
];

/// Validate a lottery title
pub fn validate_lottery_title(title: &str) -> Result<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(LottoBotError::InvalidInput("Lottery title cannot be empty".to_string()));
    }

    if title.chars().count() > 100 {
        return Err(LottoBotError::InvalidInput(
            "Lottery title cannot be longer than 100 characters".to_string(),
        ));
    }

    if title.contains('\n') || title.contains('\r') {
        return Err(LottoBotError::InvalidInput(
            "Lottery title cannot contain line breaks".to_string(),
        ));
    }

    Ok(())
}

/// Validate a Telegram chat id (user, group or supergroup range)
pub fn validate_chat_id(chat_id: i64) -> Result<()> {
    if chat_id == 0 {
        return Err(LottoBotError::InvalidInput("Chat ID cannot be zero".to_string()));
    }

    // Supergroup/channel ids are large negative numbers around -100xxxxxxxxxx
    if chat_id < -2_000_000_000_000 {
        return Err(LottoBotError::InvalidInput("Chat ID out of valid range".to_string()));
    }

    Ok(())
}

/// Parse a chat id from user-supplied text (`-100…`, group or user id)
pub fn parse_chat_id(text: &str) -> Result<i64> {
    let re = Regex::new(r"^-?\d{1,16}$").expect("static regex");
    let trimmed = text.trim();

    if !re.is_match(trimmed) {
        return Err(LottoBotError::InvalidInput(format!("Not a chat ID: {trimmed}")));
    }

    let chat_id = trimmed
        .parse::<i64>()
        .map_err(|_| LottoBotError::InvalidInput(format!("Not a chat ID: {trimmed}")))?;
    validate_chat_id(chat_id)?;
    Ok(chat_id)
}

/// Validate a stored template body: every `{token}` must be a known placeholder
pub fn validate_template_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(LottoBotError::InvalidInput("Template body cannot be empty".to_string()));
    }

    let re = Regex::new(r"\{([a-z_]+)\}").expect("static regex");
    for capture in re.captures_iter(body) {
        let token = &capture[1];
        if !KNOWN_PLACEHOLDERS.contains(&token) {
            return Err(LottoBotError::InvalidInput(format!("Unknown placeholder: {{{token}}}")));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_validate_lottery_title() {
        assert!(validate_lottery_title("Summer Giveaway").is_ok());
        assert!(validate_lottery_title("   ").is_err());
        assert!(validate_lottery_title("a\nb").is_err());
        assert!(validate_lottery_title(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_parse_chat_id_accepts_groups_and_users() {
        assert_eq!(parse_chat_id("123456789").unwrap(), 123456789);
        assert_eq!(parse_chat_id("-1001234567890").unwrap(), -1001234567890);
        assert_matches!(parse_chat_id("abc"), Err(LottoBotError::InvalidInput(_)));
        assert_matches!(parse_chat_id("0"), Err(LottoBotError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_template_body_rejects_unknown_placeholder() {
        assert!(validate_template_body("Hi {member}, you won {prize_name}").is_ok());
        assert_matches!(
            validate_template_body("Hi {nickname}"),
            Err(LottoBotError::InvalidInput(_))
        );
        assert!(validate_template_body("").is_err());
    }
}
