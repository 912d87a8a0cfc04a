use anyhow::{Context, Result};
use teloxide::types::{ChatId, Recipient, UserId};

/// Runtime configuration, read once from the environment at startup and
/// immutable afterwards. A `.env` file in the working directory is honored.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot API token.
    pub bot_token: String,
    /// Load listing endpoint polled on every cycle.
    pub feed_url: String,
    /// Broadcast target for new listings: numeric chat id or `@username`.
    pub channel: String,
    /// Operator chat id: receives notifications and alerts, sends commands.
    pub admin_id: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token = require("BOT_TOKEN")?;
        let feed_url = require("FEED_URL")?;
        let channel = require("CHANNEL_ID")?;
        let admin_id = require("ADMIN_ID")?
            .parse::<i64>()
            .context("ADMIN_ID must be a numeric chat id")?;

        Ok(Self {
            bot_token,
            feed_url,
            channel,
            admin_id,
        })
    }

    /// The broadcast recipient. `@`-prefixed values address a public channel
    /// by username; anything else must parse as a numeric chat id.
    pub fn channel_recipient(&self) -> Result<Recipient> {
        if self.channel.starts_with('@') {
            return Ok(Recipient::ChannelUsername(self.channel.clone()));
        }
        let id = self
            .channel
            .parse::<i64>()
            .context("CHANNEL_ID must be a numeric chat id or an @username")?;
        Ok(Recipient::Id(ChatId(id)))
    }

    pub fn admin_recipient(&self) -> Recipient {
        Recipient::Id(ChatId(self.admin_id))
    }

    /// Whether `user` is the operator. A private chat's id equals the user's
    /// id, so the admin chat id doubles as the authorized sender id.
    pub fn is_admin(&self, user: UserId) -> bool {
        self.admin_id >= 0 && user.0 == self.admin_id as u64
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("Missing required environment variable: {}", name))
}
