//! Notification service implementation
//!
//! Renders message templates and delivers them through the Bot API. A
//! winner's `notified` flag only flips after a confirmed send, so failed
//! deliveries can always be retried by calling the same operation again.

use teloxide::{
    Bot,
    payloads::SendMessageSetters,
    prelude::Request,
    requests::Requester,
    types::{ChatId, Message, ParseMode},
};
use tracing::{info, warn};
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::models::lottery::{Lottery, Prize};
use crate::models::template::TemplateKind;
use crate::models::winner::Winner;
use crate::services::templates::{render, TemplateContext, TemplateService};
use crate::utils::errors::Result;
use crate::utils::{helpers, logging};

/// Spacing between consecutive bulk sends, to stay under Bot API limits
const BULK_SEND_SPACING_MS: u64 = 50;

#[derive(Clone)]
pub struct NotificationService {
    bot: Bot,
    db: DatabaseService,
    templates: TemplateService,
    settings: Settings,
}

impl NotificationService {
    pub fn new(bot: Bot, db: DatabaseService, templates: TemplateService, settings: Settings) -> Self {
        Self {
            bot,
            db,
            templates,
            settings,
        }
    }

    /// Send an HTML message to a chat or user
    pub async fn send_html(&self, chat_id: i64, text: String) -> Result<Message> {
        let message = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .send()
            .await?;
        Ok(message)
    }

    /// Message one winner and flip `notified` once the send is confirmed.
    /// Safe to call again after a failure; the flag stays false until a
    /// send goes through.
    pub async fn notify_winner(&self, lottery: &Lottery, winner: &Winner) -> Result<Winner> {
        let body = self
            .templates
            .body_for(TemplateKind::WinnerPrivate, lottery.created_by)
            .await?;
        let ctx = TemplateContext {
            lottery_sn: Some(helpers::short_sn(lottery.id)),
            lottery_title: Some(lottery.title.clone()),
            member: Some(winner.display_name()),
            prize_name: Some(winner.prize_name.clone()),
            ..TemplateContext::default()
        };

        match self.send_html(winner.telegram_id, render(&body, &ctx)).await {
            Ok(_) => {
                logging::log_notification(winner.telegram_id, "winner", true);
                self.db.winners.mark_notified(winner.id).await
            }
            Err(err) => {
                logging::log_notification(winner.telegram_id, "winner", false);
                Err(err)
            }
        }
    }

    /// Fan out the results of a completed draw: each winner, the creator,
    /// and every chat the lottery was published to. Every send failure is
    /// logged and swallowed; a blocked bot must never undo a draw.
    pub async fn notify_draw_results(&self, lottery: &Lottery, winners: &[Winner]) {
        let participant_count = self
            .db
            .participants
            .count_for_lottery(lottery.id)
            .await
            .unwrap_or(0);
        let winner_list = Self::winner_list(winners);

        for winner in winners {
            if let Err(err) = self.notify_winner(lottery, winner).await {
                warn!(winner_id = %winner.id, telegram_id = winner.telegram_id, error = %err,
                    "Failed to notify winner");
            }
            tokio::time::sleep(std::time::Duration::from_millis(BULK_SEND_SPACING_MS)).await;
        }

        let summary_ctx = TemplateContext {
            lottery_sn: Some(helpers::short_sn(lottery.id)),
            lottery_title: Some(lottery.title.clone()),
            participant_count: Some(participant_count),
            winner_list: Some(winner_list.clone()),
            ..TemplateContext::default()
        };

        match self
            .templates
            .body_for(TemplateKind::CreatorSummary, lottery.created_by)
            .await
        {
            Ok(body) => {
                if let Err(err) = self.send_html(lottery.created_by, render(&body, &summary_ctx)).await {
                    warn!(creator = lottery.created_by, error = %err, "Failed to notify creator");
                }
            }
            Err(err) => warn!(error = %err, "Failed to load creator summary template"),
        }

        self.notify_published_chats(lottery, &summary_ctx).await;

        info!(lottery_id = %lottery.id, winners = winners.len(), "Draw notifications completed");
    }

    /// Push the public results message to every recorded publish target
    async fn notify_published_chats(&self, lottery: &Lottery, ctx: &TemplateContext) {
        let publishes = match self.db.publishes.list_for_lottery(lottery.id).await {
            Ok(publishes) => publishes,
            Err(err) => {
                warn!(lottery_id = %lottery.id, error = %err, "Failed to load publish history");
                return;
            }
        };

        let body = match self
            .templates
            .body_for(TemplateKind::PublicResult, lottery.created_by)
            .await
        {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "Failed to load public result template");
                return;
            }
        };
        let text = render(&body, ctx);

        for publish in publishes {
            if let Err(err) = self.send_html(publish.chat_id, text.clone()).await {
                warn!(chat_id = publish.chat_id, error = %err, "Failed to notify published chat");
            }
            tokio::time::sleep(std::time::Duration::from_millis(BULK_SEND_SPACING_MS)).await;
        }
    }

    /// Confirmation to the creator after a lottery was created
    pub async fn notify_created(&self, lottery: &Lottery, prizes: &[Prize]) -> Result<Message> {
        let ctx = TemplateContext::for_lottery(lottery, prizes, 0, &self.settings.bot.username);
        let body = self
            .templates
            .body_for(TemplateKind::Created, lottery.created_by)
            .await?;
        self.send_html(lottery.created_by, render(&body, &ctx)).await
    }

    fn winner_list(winners: &[Winner]) -> String {
        if winners.is_empty() {
            return "No winners, nobody joined this one.".to_string();
        }
        winners
            .iter()
            .map(|winner| format!("{} - {}", winner.display_name(), winner.prize_name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_winner(name: &str, prize: &str) -> Winner {
        Winner {
            id: Uuid::new_v4(),
            lottery_id: Uuid::new_v4(),
            prize_id: Uuid::new_v4(),
            telegram_id: 5,
            username: None,
            first_name: Some(name.to_string()),
            prize_name: prize.to_string(),
            notified: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_winner_list_formatting() {
        let winners = vec![make_winner("Ann", "Gift Card"), make_winner("Bob", "Sticker")];
        let list = NotificationService::winner_list(&winners);
        assert_eq!(list, "Ann - Gift Card\nBob - Sticker");
    }

    #[test]
    fn test_winner_list_empty_draw() {
        let list = NotificationService::winner_list(&[]);
        assert!(list.contains("No winners"));
    }
}
