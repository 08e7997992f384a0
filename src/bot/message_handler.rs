//! Message Handler module for processing incoming Telegram messages

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::User;
use tracing::debug;

use crate::dialogue::{DialogueEvent, OrderDialogue};
use crate::localization::Localizer;

use super::commands::Command;
use super::ui_builder::{render_reply, RenderedReply};

/// Send a rendered reply to `chat_id`
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: RenderedReply) -> Result<()> {
    let mut request = bot.send_message(chat_id, reply.text);
    if let Some(keyboard) = reply.keyboard {
        request = request.reply_markup(keyboard);
    }
    request.await?;
    Ok(())
}

/// Extract the sender's language code from Telegram
fn language_of(user: &User) -> Option<&str> {
    user.language_code.as_deref()
}

/// Handle `/start`, `/cancel` and `/help`
pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: Arc<OrderDialogue>,
    localizer: Arc<Localizer>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let language_code = language_of(user);
    debug!(user_id = %user.id, command = ?cmd, "Received command from user");

    let event = match cmd {
        Command::Start => DialogueEvent::Start,
        Command::Cancel => DialogueEvent::Cancel,
        Command::Help => {
            bot.send_message(msg.chat.id, localizer.message("help", language_code))
                .await?;
            return Ok(());
        }
    };

    let reply = dialogue.handle(user.id, event).await;
    send_reply(&bot, msg.chat.id, render_reply(&reply, &localizer, language_code)).await
}

/// Handle every message that is not a known command
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: Arc<OrderDialogue>,
    localizer: Arc<Localizer>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let language_code = language_of(user);

    let Some(text) = msg.text() else {
        debug!(user_id = %user.id, "Received non-text message from user");
        bot.send_message(msg.chat.id, localizer.message("text-only", language_code))
            .await?;
        return Ok(());
    };

    if text.starts_with('/') {
        debug!(user_id = %user.id, "Received unknown command from user");
        bot.send_message(msg.chat.id, localizer.message("help", language_code))
            .await?;
        return Ok(());
    }

    debug!(user_id = %user.id, message_length = text.len(), "Received text message from user");
    let reply = dialogue
        .handle(user.id, DialogueEvent::Text(text.to_string()))
        .await;
    send_reply(&bot, msg.chat.id, render_reply(&reply, &localizer, language_code)).await
}
