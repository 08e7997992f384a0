//! Admin notifications over Telegram

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::debug;

use crate::errors::NotifyError;
use crate::localization::Localizer;
use crate::order::{Notifier, Order};

/// Summary of `order` for the administrator, in the default language
pub fn admin_message(localizer: &Localizer, order: &Order) -> String {
    let quantity = order.quantity.to_string();
    localizer.message_with_args(
        "admin-new-order",
        None,
        &[
            ("name", order.name.as_str()),
            ("item", order.item_code.as_str()),
            ("quantity", quantity.as_str()),
        ],
    )
}

/// Sends each placed order to a fixed admin chat
pub struct TelegramNotifier {
    bot: Bot,
    admin_chat: ChatId,
    localizer: Arc<Localizer>,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, admin_chat: ChatId, localizer: Arc<Localizer>) -> Self {
        Self {
            bot,
            admin_chat,
            localizer,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, order: &Order) -> Result<(), NotifyError> {
        let text = admin_message(&self.localizer, order);
        self.bot
            .send_message(self.admin_chat, text)
            .await
            .map_err(|e| NotifyError(e.to_string()))?;
        debug!(admin_chat = %self.admin_chat, "Admin notified of new order");
        Ok(())
    }
}
