//! Callback query handlers
//!
//! Routes inline-button presses: joining a lottery, browsing active
//! lotteries and help.

use teloxide::{
    Bot,
    payloads::{AnswerCallbackQuerySetters, SendMessageSetters},
    prelude::Request,
    requests::Requester,
    types::{CallbackQuery, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};
use tracing::{debug, warn};
use uuid::Uuid;
use crate::models::participant::JoinLotteryRequest;
use crate::models::template::TemplateKind;
use crate::services::templates::{render, TemplateContext};
use crate::services::ServiceFactory;
use crate::utils::errors::{LottoBotError, Result};

/// Dispatch a callback query by its data prefix
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    services: ServiceFactory,
) -> Result<()> {
    let data = query.data.clone().unwrap_or_default();
    debug!(user_id = query.from.id.0, data = %data, "Callback query received");

    if let Some(id_text) = data.strip_prefix("join_lottery_") {
        if let Ok(lottery_id) = Uuid::parse_str(id_text) {
            return handle_join(bot, query, services, lottery_id).await;
        }
    }

    match data.as_str() {
        "show_lotteries" => handle_show_lotteries(bot, query, services).await,
        "show_help" => {
            let chat_id = ChatId(query.from.id.0 as i64);
            bot.answer_callback_query(query.id).send().await?;
            super::commands::help::send_help(&bot, chat_id).await
        }
        _ => {
            warn!(data = %data, "Unhandled callback query");
            bot.answer_callback_query(query.id).send().await?;
            Ok(())
        }
    }
}

/// Join button press: run the join flow and confirm or explain the refusal
async fn handle_join(
    bot: Bot,
    query: CallbackQuery,
    services: ServiceFactory,
    lottery_id: Uuid,
) -> Result<()> {
    let from = &query.from;
    let chat_id = ChatId(from.id.0 as i64);

    let request = JoinLotteryRequest {
        lottery_id,
        telegram_id: from.id.0 as i64,
        username: from.username.clone(),
        first_name: Some(from.first_name.clone()),
    };

    match services.lotteries.join(request).await {
        Ok(outcome) => {
            bot.answer_callback_query(query.id)
                .text("You're in, good luck!")
                .send()
                .await?;

            if let Some(lottery) = services.db.lotteries.find_by_id(lottery_id).await? {
                let body = services
                    .templates
                    .body_for(TemplateKind::JoinSuccess, lottery.created_by)
                    .await?;
                let ctx = TemplateContext {
                    lottery_sn: Some(crate::utils::helpers::short_sn(lottery.id)),
                    lottery_title: Some(lottery.title.clone()),
                    member: Some(outcome.participant.display_name()),
                    participant_count: Some(outcome.participant_count),
                    ..TemplateContext::default()
                };
                bot.send_message(chat_id, render(&body, &ctx))
                    .parse_mode(ParseMode::Html)
                    .send()
                    .await?;
            }
            Ok(())
        }
        Err(err) => {
            bot.answer_callback_query(query.id)
                .text(join_refusal_text(&err))
                .show_alert(true)
                .send()
                .await?;
            Ok(())
        }
    }
}

/// Browse the most recent active lotteries with join buttons
async fn handle_show_lotteries(bot: Bot, query: CallbackQuery, services: ServiceFactory) -> Result<()> {
    let chat_id = ChatId(query.from.id.0 as i64);
    let lotteries = services.lotteries.list_active(5).await?;

    bot.answer_callback_query(query.id).send().await?;

    if lotteries.is_empty() {
        bot.send_message(chat_id, "🎁 No lotteries are running right now. Watch your groups!")
            .send()
            .await?;
        return Ok(());
    }

    let mut text = String::from("🎁 <b>Active lotteries</b>\n\n");
    let mut keyboard_rows = Vec::new();
    for (index, lottery) in lotteries.iter().enumerate() {
        let count = services
            .db
            .participants
            .count_for_lottery(lottery.id)
            .await
            .unwrap_or(0);
        text.push_str(&format!(
            "{}. <b>{}</b> ({count} joined)\n",
            index + 1,
            lottery.title
        ));
        keyboard_rows.push(vec![InlineKeyboardButton::callback(
            format!("Join \"{}\"", crate::utils::helpers::truncate_text(&lottery.title, 30)),
            format!("join_lottery_{}", lottery.id),
        )]);
    }

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(InlineKeyboardMarkup::new(keyboard_rows))
        .send()
        .await?;

    Ok(())
}

/// User-facing explanation for a refused join
fn join_refusal_text(err: &LottoBotError) -> String {
    match err {
        LottoBotError::Blacklisted { .. } => "You are not allowed to join lotteries.".to_string(),
        LottoBotError::AlreadyJoined { .. } => "You already joined this lottery.".to_string(),
        LottoBotError::JoinLimitReached { limit } => {
            format!("Daily limit reached ({limit} joins per day). Upgrade to VIP for unlimited joins.")
        }
        LottoBotError::InvalidState { .. } => "This lottery has already ended.".to_string(),
        LottoBotError::LotteryNotFound { .. } => "That lottery does not exist.".to_string(),
        LottoBotError::InvalidInput(message) => message.clone(),
        _ => "Something went wrong, please try again later.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_refusal_text_is_user_friendly() {
        let text = join_refusal_text(&LottoBotError::JoinLimitReached { limit: 3 });
        assert!(text.contains('3'));

        let text = join_refusal_text(&LottoBotError::AlreadyJoined {
            telegram_id: 1,
            lottery_id: Uuid::new_v4(),
        });
        assert!(text.contains("already joined"));

        let text = join_refusal_text(&LottoBotError::Database(sqlx::Error::PoolTimedOut));
        assert!(text.contains("try again"));
    }
}
