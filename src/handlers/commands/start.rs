//! Start command handler
//!
//! Handles /start, including `lottery_<id>` deep-link payloads that open a
//! join prompt for a specific lottery.

use teloxide::{
    Bot,
    payloads::SendMessageSetters,
    prelude::Request,
    requests::Requester,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, ParseMode},
};
use tracing::{debug, info};
use uuid::Uuid;
use crate::models::template::TemplateKind;
use crate::services::templates::{render, TemplateContext};
use crate::services::ServiceFactory;
use crate::utils::errors::{LottoBotError, Result};

/// Handle /start, with or without a deep-link payload
pub async fn handle_start(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| LottoBotError::InvalidInput("No user in message".to_string()))?;

    let user_id = user.id.0 as i64;
    debug!(user_id = user_id, "Processing /start command");

    services
        .db
        .touch_user(
            user_id,
            user.username.clone(),
            Some(user.first_name.clone()),
            user.last_name.clone(),
        )
        .await?;

    let payload = msg
        .text()
        .and_then(|text| text.split_whitespace().nth(1))
        .unwrap_or("");

    if let Some(id_text) = payload.strip_prefix("lottery_") {
        if let Ok(lottery_id) = Uuid::parse_str(id_text) {
            return send_join_prompt(&bot, &msg, &services, lottery_id).await;
        }
    }

    send_welcome_menu(&bot, &msg).await
}

/// Render the join prompt for a deep-linked lottery
async fn send_join_prompt(
    bot: &Bot,
    msg: &Message,
    services: &ServiceFactory,
    lottery_id: Uuid,
) -> Result<()> {
    let lottery = match services.db.lotteries.find_by_id(lottery_id).await? {
        Some(lottery) if lottery.is_active() => lottery,
        Some(_) => {
            bot.send_message(msg.chat.id, "This lottery has already ended.")
                .send()
                .await?;
            return Ok(());
        }
        None => {
            bot.send_message(msg.chat.id, "That lottery does not exist.")
                .send()
                .await?;
            return Ok(());
        }
    };

    let prizes = services.db.lotteries.find_prizes(lottery.id).await?;
    let participant_count = services.db.participants.count_for_lottery(lottery.id).await?;

    let body = services
        .templates
        .body_for(TemplateKind::JoinPrompt, lottery.created_by)
        .await?;
    let ctx = TemplateContext::for_lottery(
        &lottery,
        &prizes,
        participant_count,
        &services.settings.bot.username,
    );

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🎯 Join this lottery",
        format!("join_lottery_{}", lottery.id),
    )]]);

    bot.send_message(msg.chat.id, render(&body, &ctx))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .send()
        .await?;

    info!(lottery_id = %lottery.id, chat_id = %msg.chat.id, "Join prompt sent");
    Ok(())
}

/// Plain welcome menu for /start without a payload
async fn send_welcome_menu(bot: &Bot, msg: &Message) -> Result<()> {
    let text = "🎰 <b>Welcome to the lottery bot!</b>\n\n\
        • 🎁 Join giveaways posted in your groups\n\
        • 🏆 Get notified automatically when you win\n\
        • 💎 VIP members join without daily limits\n\n\
        Tap a button below to get started:";

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("🎁 Active lotteries", "show_lotteries"),
            InlineKeyboardButton::callback("❓ Help", "show_help"),
        ],
    ]);

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .send()
        .await?;

    Ok(())
}
