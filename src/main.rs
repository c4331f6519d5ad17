use rangebot::api::KrakenClient;
use rangebot::config::{BotConfig, TelegramConfig};
use rangebot::execution::TradeEngine;
use rangebot::notify::TelegramNotifier;
use rangebot::persistence::{SummaryArchive, TradeLogStore};
use rangebot::scheduler::Scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = BotConfig::default();
    let telegram = TelegramConfig::from_env()?;

    tracing::info!("🚀 rangebot starting");
    tracing::info!("  Pair: {}", config.pair);
    tracing::info!("  Trade amount: {}", config.trade_amount);
    tracing::info!("  Range window: {} candles", config.candle_lookback);
    tracing::info!("  Cooldown: {:?}", config.cooldown);

    let market = KrakenClient::new(config.max_retries, config.retry_backoff);
    let notifier = TelegramNotifier::new(telegram);

    let trade_log = TradeLogStore::new(config.trade_log_path.clone());
    trade_log.ensure_exists()?;
    let archive = SummaryArchive::new(config.summary_path.clone());

    let engine = TradeEngine::new(market, notifier, trade_log.clone(), config.clone());
    let scheduler = Scheduler::new(engine, trade_log, archive, config);

    scheduler.run().await;
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rangebot=info".into()),
        )
        .init();
}
