mod alerts;
mod bot;
mod config;
mod feed;
mod format;
mod notify;
mod poller;
mod queue;
mod sink;
mod state;

use std::sync::Arc;

use anyhow::Result;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::alerts::AlertFilter;
use crate::bot::AppState;
use crate::config::Config;
use crate::feed::FeedClient;
use crate::notify::Notifier;
use crate::poller::Poller;
use crate::sink::{MessageSink, TelegramSink};
use crate::state::SeenStore;

/// Dedup state lives next to the binary, one JSON object per deployment.
const STATE_FILE: &str = "seen_loads.json";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,loadrelay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Configuration loaded");
    info!("  Feed: {}", config.feed_url);
    info!("  Channel: {}", config.channel);
    info!("  Admin: {}", config.admin_id);

    let bot = Bot::new(&config.bot_token);

    // Three sinks over one bot: the channel broadcast and the admin alert
    // copy carry listing Markdown; operational notices go out as plain text.
    let channel_sink: Arc<dyn MessageSink> = Arc::new(TelegramSink::new(
        bot.clone(),
        config.channel_recipient()?,
        true,
    ));
    let alert_sink: Arc<dyn MessageSink> =
        Arc::new(TelegramSink::new(bot.clone(), config.admin_recipient(), true));
    let notifier = Notifier::new(Arc::new(TelegramSink::new(
        bot.clone(),
        config.admin_recipient(),
        false,
    )));

    let queue = queue::spawn(channel_sink, notifier.clone(), queue::SEND_PACING);
    let alerts = AlertFilter::new();

    let poller = Poller::new(
        FeedClient::new(config.feed_url.clone()),
        SeenStore::new(STATE_FILE),
        queue,
        alerts.clone(),
        alert_sink,
        notifier.clone(),
    );

    notifier.notify("Started").await;
    info!("Started");

    tokio::spawn(poller.run());

    // The command listener runs on the current task until the process exits.
    let state = Arc::new(AppState { alerts, notifier });
    bot::run(bot, config, state).await?;

    Ok(())
}
