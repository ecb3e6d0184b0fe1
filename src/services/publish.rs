//! Publish service implementation
//!
//! Pushes lottery announcements to chats and records each push. The
//! publish history is an advisory duplicate guard: an unforced re-push to
//! the same chat returns a warning instead of sending, and the caller
//! decides whether to force it.

use chrono::{DateTime, Utc};
use teloxide::{
    Bot,
    payloads::SendMessageSetters,
    prelude::Request,
    requests::Requester,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};
use tracing::warn;
use url::Url;
use uuid::Uuid;
use crate::config::Settings;
use crate::database::DatabaseService;
use crate::models::lottery::Lottery;
use crate::models::publish::{LotteryPublish, NewPublishRecord};
use crate::models::template::TemplateKind;
use crate::services::templates::{render, TemplateContext, TemplateService};
use crate::utils::errors::{LottoBotError, Result};
use crate::utils::validation::validate_chat_id;
use crate::utils::{helpers, logging};

/// Outcome of a publish request
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    /// The announcement was sent and recorded
    Published(LotteryPublish),
    /// A prior push exists and `force` was not set; nothing was sent
    AlreadyPublished {
        published_at: DateTime<Utc>,
        chat_title: String,
    },
}

/// Result of one target during an announcement-channel sweep
#[derive(Debug, Clone)]
pub struct AutoPublishResult {
    pub chat_id: i64,
    pub title: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct PublishService {
    bot: Bot,
    db: DatabaseService,
    templates: TemplateService,
    settings: Settings,
}

impl PublishService {
    pub fn new(bot: Bot, db: DatabaseService, templates: TemplateService, settings: Settings) -> Self {
        Self {
            bot,
            db,
            templates,
            settings,
        }
    }

    /// Push a lottery announcement to a chat.
    ///
    /// Unless forced, a prior push to the same chat short-circuits with a
    /// warning carrying the earlier timestamp and chat title. The guard is
    /// advisory only; concurrent forced pushes may both record.
    pub async fn publish(
        &self,
        lottery_id: Uuid,
        chat_id: i64,
        published_by: i64,
        force: bool,
    ) -> Result<PublishOutcome> {
        validate_chat_id(chat_id)?;

        let lottery = self
            .db
            .lotteries
            .find_by_id(lottery_id)
            .await?
            .ok_or(LottoBotError::LotteryNotFound { lottery_id })?;

        if !force {
            if let Some(existing) = self.db.publishes.latest_for(lottery_id, chat_id).await? {
                return Ok(PublishOutcome::AlreadyPublished {
                    published_at: existing.published_at,
                    chat_title: existing.chat_title,
                });
            }
        }

        let record = self.push(&lottery, chat_id, published_by).await?;
        logging::log_publish(lottery_id, chat_id, force);
        Ok(PublishOutcome::Published(record))
    }

    /// Send the announcement and record the push
    async fn push(&self, lottery: &Lottery, chat_id: i64, published_by: i64) -> Result<LotteryPublish> {
        let prizes = self.db.lotteries.find_prizes(lottery.id).await?;
        let participant_count = self.db.participants.count_for_lottery(lottery.id).await?;

        // A chat we cannot look up still gets the push; its id stands in
        // for the title.
        let chat_title = match self.bot.get_chat(ChatId(chat_id)).send().await {
            Ok(chat) => chat
                .title()
                .map(|title| title.to_string())
                .unwrap_or_else(|| chat_id.to_string()),
            Err(err) => {
                warn!(chat_id = chat_id, error = %err, "Failed to fetch chat info");
                chat_id.to_string()
            }
        };

        let ctx = TemplateContext::for_lottery(lottery, &prizes, participant_count, &self.settings.bot.username);
        let body = self
            .templates
            .body_for(TemplateKind::Publish, lottery.created_by)
            .await?;

        let link = helpers::lottery_deep_link(&self.settings.bot.username, lottery.id);
        let join_url = Url::parse(&link)
            .map_err(|err| LottoBotError::InvalidInput(format!("Bad deep link: {err}")))?;
        let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
            "🎯 Join now",
            join_url,
        )]]);

        let message = self
            .bot
            .send_message(ChatId(chat_id), render(&body, &ctx))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .send()
            .await?;

        self.db
            .publishes
            .create(NewPublishRecord {
                lottery_id: lottery.id,
                chat_id,
                chat_title,
                message_id: Some(message.id.0),
                published_by,
            })
            .await
    }

    /// Push a lottery to every registered announcement channel. One failed
    /// channel never stops the sweep.
    pub async fn auto_publish(&self, lottery: &Lottery) -> Result<Vec<AutoPublishResult>> {
        let channels = self.db.channels.list().await?;
        let mut results = Vec::with_capacity(channels.len());

        for channel in channels {
            match self.push(lottery, channel.chat_id, lottery.created_by).await {
                Ok(_) => results.push(AutoPublishResult {
                    chat_id: channel.chat_id,
                    title: channel.title,
                    success: true,
                    error: None,
                }),
                Err(err) => {
                    warn!(chat_id = channel.chat_id, error = %err, "Auto-publish failed for channel");
                    results.push(AutoPublishResult {
                        chat_id: channel.chat_id,
                        title: channel.title,
                        success: false,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        Ok(results)
    }
}
