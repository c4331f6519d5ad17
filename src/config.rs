use std::path::PathBuf;
use std::time::Duration;

/// Bot configuration.
///
/// The trading parameters are fixed constants (there is no CLI surface);
/// only the Telegram credentials come from the environment. Intervals live
/// here rather than as module constants so tests can shrink them.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Kraken pair, e.g. "SOLUSDT"
    pub pair: String,
    /// Simulated position size, in base units
    pub trade_amount: f64,
    /// How many 1-minute candles make up the range
    pub candle_lookback: usize,
    /// How often to poll the current price while watching or in a position
    pub poll_interval: Duration,
    /// Fixed backoff between fetch retries
    pub retry_backoff: Duration,
    /// Fetch attempts before giving up on a request
    pub max_retries: u32,
    /// Pause between monitoring cycles
    pub cooldown: Duration,
    /// How often to roll the trade log into a summary
    pub summary_period: chrono::Duration,
    /// Pause before resuming after an unexpected cycle failure
    pub recovery_delay: Duration,
    pub trade_log_path: PathBuf,
    pub summary_path: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            pair: "SOLUSDT".to_string(),
            trade_amount: 0.01,
            candle_lookback: 7,
            poll_interval: Duration::from_secs(10),
            retry_backoff: Duration::from_secs(5),
            max_retries: 3,
            cooldown: Duration::from_secs(15 * 60),
            summary_period: chrono::Duration::days(30),
            recovery_delay: Duration::from_secs(10),
            trade_log_path: PathBuf::from("trade_log.json"),
            summary_path: PathBuf::from("monthly_profit_loss.json"),
        }
    }
}

/// Telegram credentials, sourced from the environment.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    /// Read `TELEGRAM_TOKEN` and `CHAT_ID` from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let token = std::env::var("TELEGRAM_TOKEN")
            .map_err(|_| anyhow::anyhow!("TELEGRAM_TOKEN not found in environment"))?;
        let chat_id = std::env::var("CHAT_ID")
            .map_err(|_| anyhow::anyhow!("CHAT_ID not found in environment"))?;
        Ok(Self { token, chat_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BotConfig::default();

        assert_eq!(config.pair, "SOLUSDT");
        assert_eq!(config.candle_lookback, 7);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.cooldown, Duration::from_secs(900));
        assert_eq!(config.summary_period, chrono::Duration::days(30));
    }
}
