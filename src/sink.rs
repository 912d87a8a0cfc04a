use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, Recipient};

/// Outbound message sink. The delivery worker, the notifier and the alert
/// path all talk to this trait instead of the bot directly.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Sends to one fixed Telegram recipient, optionally in Markdown mode.
pub struct TelegramSink {
    bot: Bot,
    to: Recipient,
    markdown: bool,
}

impl TelegramSink {
    pub fn new(bot: Bot, to: Recipient, markdown: bool) -> Self {
        Self { bot, to, markdown }
    }
}

#[async_trait]
impl MessageSink for TelegramSink {
    async fn send(&self, text: &str) -> Result<()> {
        let mut request = self.bot.send_message(self.to.clone(), text);
        if self.markdown {
            request = request.parse_mode(ParseMode::Markdown);
        }
        request.await.context("Failed to send Telegram message")?;
        Ok(())
    }
}
