//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `commands`: The `/start`, `/cancel` and `/help` commands
//! - `message_handler`: Handles commands and free text messages
//! - `callback_handler`: Handles menu button presses
//! - `ui_builder`: Creates keyboards and formats replies
//! - `notifier`: Forwards placed orders to the admin chat

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

pub mod callback_handler;
pub mod commands;
pub mod message_handler;
pub mod notifier;
pub mod ui_builder;

pub use callback_handler::callback_handler;
pub use commands::Command;
pub use message_handler::{command_handler, message_handler};
pub use notifier::TelegramNotifier;

/// Routing tree of the bot
///
/// Expects `Arc<OrderDialogue>` and `Arc<Localizer>` among the dispatcher
/// dependencies.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let messages = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(dptree::endpoint(message_handler));

    dptree::entry()
        .branch(messages)
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}
