//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

use crate::dialogue::Reply;
use crate::localization::Localizer;
use crate::menu::MenuEntry;

/// Prefix of the callback payload of menu buttons
pub const ITEM_CALLBACK_PREFIX: &str = "item|";
/// Telegram's limit on callback payloads
pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

/// Callback payload selecting `code`
pub fn item_callback_data(code: &str) -> String {
    format!("{ITEM_CALLBACK_PREFIX}{code}")
}

/// Item code carried by a menu button payload
pub fn parse_item_callback(data: &str) -> Option<&str> {
    data.strip_prefix(ITEM_CALLBACK_PREFIX)
        .filter(|code| !code.is_empty())
}

/// Create the inline keyboard for the menu, one item per row
///
/// Returns `None` when no entry can be shown.
pub fn menu_keyboard(entries: &[MenuEntry]) -> Option<InlineKeyboardMarkup> {
    let buttons: Vec<Vec<InlineKeyboardButton>> = entries
        .iter()
        .filter_map(|entry| {
            let data = item_callback_data(&entry.code);
            if data.len() > MAX_CALLBACK_DATA_BYTES {
                warn!(code = %entry.code, "Item code too long for a menu button, skipped");
                return None;
            }
            Some(vec![InlineKeyboardButton::callback(entry.name.clone(), data)])
        })
        .collect();

    if buttons.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(buttons))
    }
}

/// A reply ready to be sent
#[derive(Debug, Clone)]
pub struct RenderedReply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

/// Format a dialogue reply in the user's language
pub fn render_reply(reply: &Reply, localizer: &Localizer, language: Option<&str>) -> RenderedReply {
    match reply {
        Reply::Menu(entries) => {
            let keyboard = menu_keyboard(entries);
            let mut text = localizer.message("welcome", language);
            if keyboard.is_none() {
                text = format!("{}\n\n{}", text, localizer.message("menu-empty", language));
            }
            RenderedReply { text, keyboard }
        }
        Reply::Prompt(prompt) => RenderedReply {
            text: localizer.message(prompt.message_key(), language),
            keyboard: None,
        },
    }
}
