//! Message template model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A stored message template. `owner_telegram_id` scopes the override to one
/// creator; a NULL owner overrides the built-in default globally.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    pub id: i64,
    pub kind: String,
    pub owner_telegram_id: Option<i64>,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// The message kinds the platform sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Announcement pushed to a chat/channel
    Publish,
    /// Prompt shown to a user opening a lottery deep link
    JoinPrompt,
    /// Confirmation after a successful join
    JoinSuccess,
    /// Private message to each winner
    WinnerPrivate,
    /// Private results summary for the creator
    CreatorSummary,
    /// Results message pushed to published chats
    PublicResult,
    /// Confirmation to the creator after creating a lottery
    Created,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Publish => "publish",
            TemplateKind::JoinPrompt => "join_prompt",
            TemplateKind::JoinSuccess => "join_success",
            TemplateKind::WinnerPrivate => "winner_private",
            TemplateKind::CreatorSummary => "creator_summary",
            TemplateKind::PublicResult => "public_result",
            TemplateKind::Created => "created",
        }
    }

    pub fn parse(value: &str) -> Option<TemplateKind> {
        match value {
            "publish" => Some(TemplateKind::Publish),
            "join_prompt" => Some(TemplateKind::JoinPrompt),
            "join_success" => Some(TemplateKind::JoinSuccess),
            "winner_private" => Some(TemplateKind::WinnerPrivate),
            "creator_summary" => Some(TemplateKind::CreatorSummary),
            "public_result" => Some(TemplateKind::PublicResult),
            "created" => Some(TemplateKind::Created),
            _ => None,
        }
    }

    pub fn all() -> &'static [TemplateKind] {
        &[
            TemplateKind::Publish,
            TemplateKind::JoinPrompt,
            TemplateKind::JoinSuccess,
            TemplateKind::WinnerPrivate,
            TemplateKind::CreatorSummary,
            TemplateKind::PublicResult,
            TemplateKind::Created,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in TemplateKind::all() {
            assert_eq!(TemplateKind::parse(kind.as_str()), Some(*kind));
        }
        assert_eq!(TemplateKind::parse("farewell"), None);
    }
}
