use crate::api::MarketData;
use crate::config::BotConfig;
use crate::execution::monitor::{stop_hit, tightened_stop};
use crate::models::{Direction, EntryKind, Position, TradeRecord};
use crate::notify::{send_quiet, Notifier};
use crate::persistence::TradeLogStore;
use crate::strategy::{detect_band, BreakoutState, Transition};
use crate::Result;
use chrono::Utc;
use tokio::time::sleep;

const EXIT_REASON: &str = "Trailing Stop Loss Hit";

/// Runs one full monitoring cycle: range detection, breakout watching,
/// entry, and the trailing-stop loop. One cycle produces at most one
/// simulated trade.
pub struct TradeEngine<M: MarketData, N: Notifier> {
    market: M,
    notifier: N,
    trade_log: TradeLogStore,
    config: BotConfig,
}

impl<M: MarketData, N: Notifier> TradeEngine<M, N> {
    pub fn new(market: M, notifier: N, trade_log: TradeLogStore, config: BotConfig) -> Self {
        Self {
            market,
            notifier,
            trade_log,
            config,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// One monitoring cycle.
    ///
    /// A failed candle fetch (after the client's own retries) skips the
    /// cycle; the scheduler tries again after the cooldown. A failed price
    /// fetch only skips that tick.
    pub async fn monitor_market(&self) -> Result<()> {
        let candles = match self
            .market
            .recent_candles(&self.config.pair, self.config.candle_lookback)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                tracing::warn!("Candle fetch failed, skipping cycle: {}", e);
                return Ok(());
            }
        };

        let Some(band) = detect_band(&candles) else {
            tracing::warn!("No candles returned, skipping cycle");
            return Ok(());
        };

        tracing::info!(high = band.high, low = band.low, "Monitoring market");
        send_quiet(
            &self.notifier,
            &format!(
                "Monitoring market. {}-minute range: High = {}, Low = {}",
                self.config.candle_lookback, band.high, band.low
            ),
        )
        .await;

        let mut state = BreakoutState::Watching;
        loop {
            sleep(self.config.poll_interval).await;

            let price = match self.market.current_price(&self.config.pair).await {
                Ok(price) => price,
                Err(e) => {
                    tracing::warn!("Price fetch failed, skipping tick: {}", e);
                    continue;
                }
            };
            tracing::debug!(price, "Current price");

            match state.advance(band, price) {
                Transition::Stay(next) => {
                    if let (BreakoutState::Watching, BreakoutState::Signaled(direction)) =
                        (state, next)
                    {
                        let edge = match direction {
                            Direction::Long => format!("above {}", band.high),
                            Direction::Short => format!("below {}", band.low),
                        };
                        tracing::info!(%direction, price, "Signal generated");
                        send_quiet(
                            &self.notifier,
                            &format!("Signal generated: {} {}", direction, edge),
                        )
                        .await;
                    }
                    state = next;
                }
                Transition::Enter(entry) => {
                    let message = match entry.kind {
                        EntryKind::Retracement => format!(
                            "Entering {} trade on retracement at {}",
                            entry.direction, entry.price
                        ),
                        EntryKind::Chase => {
                            format!("Chasing {} trade at {}", entry.direction, entry.price)
                        }
                    };
                    tracing::info!(
                        direction = %entry.direction,
                        price = entry.price,
                        stop_loss = entry.stop_loss,
                        kind = ?entry.kind,
                        "Entering position"
                    );
                    send_quiet(&self.notifier, &message).await;

                    let position =
                        Position::open(entry.direction, entry.price, entry.stop_loss, entry.kind);
                    self.trailing_stop_loss(position).await?;
                    return Ok(());
                }
            }
        }
    }

    /// Manage an open position until the trailing stop fires.
    async fn trailing_stop_loss(&self, mut position: Position) -> Result<()> {
        loop {
            sleep(self.config.poll_interval).await;

            let price = match self.market.current_price(&self.config.pair).await {
                Ok(price) => price,
                Err(e) => {
                    tracing::warn!("Price fetch failed, skipping tick: {}", e);
                    continue;
                }
            };

            position.stop_loss = tightened_stop(
                position.direction,
                position.entry_price,
                position.stop_loss,
                price,
            );

            if stop_hit(position.direction, position.stop_loss, price) {
                let now = Utc::now();
                let record = TradeRecord::close_out(
                    position.direction,
                    position.entry_price,
                    price,
                    self.config.trade_amount,
                    EXIT_REASON,
                    now,
                );
                self.trade_log.append(&record)?;

                tracing::info!(
                    position_id = %position.id,
                    entry_kind = ?position.entry_kind,
                    held_secs = position.held_for(now).num_seconds(),
                    exit_price = price,
                    profit_loss = record.profit_loss,
                    "Trailing stop hit, position closed"
                );
                send_quiet(
                    &self.notifier,
                    &format!(
                        "Trailing Stop Loss Hit - Exiting {} at {}",
                        position.direction, price
                    ),
                )
                .await;
                return Ok(());
            }
        }
    }
}
