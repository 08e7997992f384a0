use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use order_bot::bot::{self, Command, TelegramNotifier};
use order_bot::config::BotConfig;
use order_bot::dialogue::OrderDialogue;
use order_bot::health;
use order_bot::localization::Localizer;
use order_bot::session::SessionStore;
use order_bot::sheets::{SheetMenuSource, SheetOrderSink, SheetsClient};

const DEFAULT_LOG_FILTER: &str = "order_bot=info,teloxide=warn";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting Order Bot");

    let config = BotConfig::from_env()?;
    let localizer = Arc::new(Localizer::new(&config.default_language)?);
    info!(languages = ?localizer.languages(), "Localization loaded");

    let sheets = Arc::new(
        SheetsClient::from_config(&config.sheets).context("Failed to initialize Google Sheets client")?,
    );
    let menu = Arc::new(SheetMenuSource::new(Arc::clone(&sheets), &config.sheets.menu_worksheet));
    let sink = Arc::new(SheetOrderSink::new(Arc::clone(&sheets), &config.sheets.orders_worksheet));

    let sessions = Arc::new(SessionStore::new(config.session_ttl));
    let sweep_every = (config.session_ttl / 4).max(Duration::from_secs(1));
    SessionStore::spawn_sweeper(Arc::clone(&sessions), sweep_every);

    let bot = Bot::new(&config.bot_token);

    let mut dialogue = OrderDialogue::new(menu, sink, sessions, config.retry.clone());
    match config.admin_chat_id {
        Some(admin_chat) => {
            info!(admin_chat = %admin_chat, "Admin notifications enabled");
            dialogue = dialogue.with_notifier(Arc::new(TelegramNotifier::new(
                bot.clone(),
                admin_chat,
                Arc::clone(&localizer),
            )));
        }
        None => info!("ADMIN_CHAT_ID not set, admin notifications disabled"),
    }
    let dialogue = Arc::new(dialogue);

    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port, shutdown_signal()).await {
            error!(error = %e, "Liveness endpoint stopped");
        }
    });

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![dialogue, localizer])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Order Bot stopped");
    Ok(())
}
