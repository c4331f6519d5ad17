use crate::config::TelegramConfig;
use crate::error::BotError;
use crate::notify::Notifier;
use crate::Result;
use anyhow::Context;
use reqwest::Client;
use std::time::Duration;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API notifier (`sendMessage` to one chat).
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self::with_base_url(TELEGRAM_API_BASE.to_string(), config)
    }

    /// Create a notifier against a custom base URL (used by tests).
    pub fn with_base_url(base_url: String, config: TelegramConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url,
            token: config.token,
            chat_id: config.chat_id,
        }
    }

    async fn post_message(&self, text: &str) -> anyhow::Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let payload = [("chat_id", self.chat_id.as_str()), ("text", text)];

        self.client
            .post(&url)
            .form(&payload)
            .send()
            .await
            .context("Failed to reach Telegram")?
            .error_for_status()
            .context("Telegram rejected message")?;

        tracing::debug!("Telegram message sent: {}", text);
        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.post_message(text).await.map_err(BotError::notify)
    }
}
