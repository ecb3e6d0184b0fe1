//! Help command handler

use teloxide::{
    Bot,
    payloads::SendMessageSetters,
    prelude::Request,
    requests::Requester,
    types::{ChatId, Message, ParseMode},
};
use crate::utils::errors::Result;

pub const HELP_TEXT: &str = "📖 <b>How it works</b>\n\n\
<b>🎁 Joining a lottery</b>\n\
1. Find a lottery announcement in a group\n\
2. Tap the join button\n\
3. Wait for the draw; winners get a private message\n\n\
<b>💎 VIP</b>\n\
VIP members are not limited to a few joins per day.\n\n\
<b>📌 Commands</b>\n\
/start - main menu\n\
/help - this message\n\n\
Questions? Contact the lottery's organizer.";

/// Handle /help
pub async fn handle_help(bot: Bot, msg: Message) -> Result<()> {
    send_help(&bot, msg.chat.id).await
}

pub async fn send_help(bot: &Bot, chat_id: ChatId) -> Result<()> {
    bot.send_message(chat_id, HELP_TEXT)
        .parse_mode(ParseMode::Html)
        .send()
        .await?;
    Ok(())
}
