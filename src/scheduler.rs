use crate::api::MarketData;
use crate::config::BotConfig;
use crate::error::BotError;
use crate::execution::TradeEngine;
use crate::models::Summary;
use crate::notify::{send_quiet, Notifier};
use crate::persistence::{SummaryArchive, TradeLogStore};
use crate::Result;
use chrono::{DateTime, Utc};
use tokio::time::sleep;

/// Outer loop: summary rollover, one monitoring cycle, cooldown.
///
/// This is also the crash-recovery wrapper: any error escaping a cycle is
/// reported via the notifier and followed by a short delay, and the loop
/// resumes. The process never terminates on error.
pub struct Scheduler<M: MarketData, N: Notifier> {
    engine: TradeEngine<M, N>,
    trade_log: TradeLogStore,
    archive: SummaryArchive,
    config: BotConfig,
}

impl<M: MarketData, N: Notifier> Scheduler<M, N> {
    pub fn new(
        engine: TradeEngine<M, N>,
        trade_log: TradeLogStore,
        archive: SummaryArchive,
        config: BotConfig,
    ) -> Self {
        Self {
            engine,
            trade_log,
            archive,
            config,
        }
    }

    /// Run forever. The last-summary timestamp is threaded through the
    /// loop explicitly rather than held in shared state.
    pub async fn run(&self) {
        send_quiet(self.engine.notifier(), "Starting trading bot...").await;
        let mut last_summary = Utc::now();

        loop {
            match self.cycle(&mut last_summary).await {
                Ok(()) => sleep(self.config.cooldown).await,
                Err(e) => {
                    self.report_failure(&e).await;
                    sleep(self.config.recovery_delay).await;
                }
            }
        }
    }

    /// One outer iteration: roll the summary if due, then monitor.
    pub async fn cycle(&self, last_summary: &mut DateTime<Utc>) -> Result<()> {
        if Utc::now() >= *last_summary + self.config.summary_period {
            self.generate_summary().await?;
            *last_summary = Utc::now();
        }

        self.engine.monitor_market().await
    }

    /// Roll the live trade log into the archive and reset it.
    pub async fn generate_summary(&self) -> Result<Summary> {
        self.trade_log.ensure_exists()?;
        let trades = self.trade_log.read_all()?;
        let summary = Summary::from_trades(trades, Utc::now());

        self.archive.append(&summary)?;
        self.trade_log.reset()?;

        tracing::info!(
            total_profit_loss = summary.total_profit_loss,
            trade_count = summary.trade_count,
            "Generated 30-day summary"
        );
        send_quiet(
            self.engine.notifier(),
            &format!(
                "30-day report: Total P/L = {}. Logs reset.",
                summary.total_profit_loss
            ),
        )
        .await;

        Ok(summary)
    }

    /// Report a failed cycle. The notification carries the error text so
    /// the operator sees what broke without shell access.
    pub async fn report_failure(&self, err: &BotError) {
        tracing::error!("Monitoring cycle failed: {}", err);
        send_quiet(
            self.engine.notifier(),
            &format!("Bot crashed: {}. Restarting...", err),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MarketData;
    use crate::models::{Candle, Direction, TradeRecord};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct UnavailableMarket;

    impl MarketData for UnavailableMarket {
        async fn recent_candles(&self, _pair: &str, _limit: usize) -> Result<Vec<Candle>> {
            Err(BotError::market_data(anyhow::anyhow!("exchange down")))
        }

        async fn current_price(&self, _pair: &str) -> Result<f64> {
            Err(BotError::market_data(anyhow::anyhow!("exchange down")))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<()> {
            self.messages.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rangebot-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn test_scheduler(dir: &PathBuf) -> Scheduler<UnavailableMarket, RecordingNotifier> {
        let config = BotConfig {
            trade_log_path: dir.join("trade_log.json"),
            summary_path: dir.join("monthly_profit_loss.json"),
            ..BotConfig::default()
        };
        let trade_log = TradeLogStore::new(config.trade_log_path.clone());
        let archive = SummaryArchive::new(config.summary_path.clone());
        let engine = TradeEngine::new(
            UnavailableMarket,
            RecordingNotifier::default(),
            trade_log.clone(),
            config.clone(),
        );
        Scheduler::new(engine, trade_log, archive, config)
    }

    fn sample_trade(profit: f64) -> TradeRecord {
        TradeRecord {
            entry_price: 100.0,
            exit_price: 100.0 + profit,
            trade_type: Direction::Long,
            profit_loss: profit,
            time: "2025-01-01 00:00:00".to_string(),
            reason: "Trailing Stop Loss Hit".to_string(),
        }
    }

    #[tokio::test]
    async fn test_summary_on_empty_log_resets_and_reports_zero() {
        let dir = temp_dir();
        let scheduler = test_scheduler(&dir);

        let summary = scheduler.generate_summary().await.unwrap();

        assert_eq!(summary.total_profit_loss, 0.0);
        assert_eq!(summary.trade_count, 0);
        // Log exists and is an empty array afterwards
        let raw = fs::read_to_string(dir.join("trade_log.json")).unwrap();
        assert_eq!(raw, "[]");
        assert_eq!(scheduler.archive.read_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_summary_totals_and_resets_log() {
        let dir = temp_dir();
        let scheduler = test_scheduler(&dir);
        scheduler.trade_log.append(&sample_trade(0.5)).unwrap();
        scheduler.trade_log.append(&sample_trade(-0.2)).unwrap();

        let summary = scheduler.generate_summary().await.unwrap();

        assert_eq!(summary.trade_count, 2);
        assert!((summary.total_profit_loss - 0.3).abs() < 1e-9);
        assert!(scheduler.trade_log.read_all().unwrap().is_empty());

        let messages = scheduler.engine.notifier().messages.lock().unwrap();
        assert!(messages.iter().any(|m| m.contains("30-day report")));
    }

    #[tokio::test]
    async fn test_cycle_rolls_over_when_period_elapsed() {
        let dir = temp_dir();
        let scheduler = test_scheduler(&dir);
        let mut last_summary = Utc::now() - chrono::Duration::days(31);

        // Market is down so the monitoring part skips immediately
        scheduler.cycle(&mut last_summary).await.unwrap();

        assert_eq!(scheduler.archive.read_all().unwrap().len(), 1);
        assert!(Utc::now() - last_summary < chrono::Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_cycle_skips_rollover_before_period() {
        let dir = temp_dir();
        let scheduler = test_scheduler(&dir);
        let started = Utc::now() - chrono::Duration::days(1);
        let mut last_summary = started;

        scheduler.cycle(&mut last_summary).await.unwrap();

        assert!(scheduler.archive.read_all().unwrap().is_empty());
        assert_eq!(last_summary, started);
    }

    #[tokio::test]
    async fn test_report_failure_notifies_with_error_text() {
        let dir = temp_dir();
        let scheduler = test_scheduler(&dir);
        let err = BotError::storage(anyhow::anyhow!("disk full"));

        scheduler.report_failure(&err).await;

        let messages = scheduler.engine.notifier().messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Bot crashed"));
        assert!(messages[0].contains("disk full"));
        assert!(messages[0].contains("Restarting"));
    }
}
