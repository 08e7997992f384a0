//! Callback Handler module for processing inline keyboard callback queries

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, warn};

use crate::dialogue::{DialogueEvent, OrderDialogue};
use crate::localization::Localizer;

use super::message_handler::send_reply;
use super::ui_builder::{parse_item_callback, render_reply};

/// Handle menu button presses
///
/// The message holding the menu is edited into the next prompt when Telegram
/// still gives access to it; otherwise the prompt is sent as a new message.
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: Arc<OrderDialogue>,
    localizer: Arc<Localizer>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(code) = q.data.as_deref().and_then(parse_item_callback) else {
        debug!(user_id = %q.from.id, "Ignoring callback without an item payload");
        return Ok(());
    };

    let language_code = q.from.language_code.as_deref();
    let reply = dialogue
        .handle(q.from.id, DialogueEvent::SelectItem(code.to_string()))
        .await;
    let rendered = render_reply(&reply, &localizer, language_code);

    match (&q.message, rendered.keyboard.is_none()) {
        (Some(msg), true) => {
            if let Err(e) = bot
                .edit_message_text(msg.chat().id, msg.id(), rendered.text.clone())
                .await
            {
                warn!(user_id = %q.from.id, error = %e, "Failed to edit menu message, sending instead");
                send_reply(&bot, msg.chat().id, rendered).await?;
            }
        }
        (Some(msg), false) => send_reply(&bot, msg.chat().id, rendered).await?,
        (None, _) => send_reply(&bot, ChatId::from(q.from.id), rendered).await?,
    }

    Ok(())
}
