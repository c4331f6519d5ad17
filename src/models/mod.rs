use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One-minute OHLCV candlestick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// High/low band over the recent candle window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub high: f64,
    pub low: f64,
}

/// Trade direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// How a signal converted into an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Price pulled back inside the band after the breakout
    Retracement,
    /// Price never pulled back; entered at the breakout side
    Chase,
}

/// Simulated open position. At most one exists at a time, in memory only.
#[derive(Debug, Clone)]
pub struct Position {
    pub id: Uuid,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub entry_kind: EntryKind,
    pub entry_time: DateTime<Utc>,
}

impl Position {
    pub fn open(direction: Direction, entry_price: f64, stop_loss: f64, kind: EntryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            direction,
            entry_price,
            stop_loss,
            entry_kind: kind,
            entry_time: Utc::now(),
        }
    }

    /// How long the position has been open as of `now`.
    pub fn held_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.entry_time
    }
}

/// Completed simulated trade, appended to the trade log.
///
/// Field names match the log files the bot has always written, so existing
/// `trade_log.json` files stay readable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub entry_price: f64,
    pub exit_price: f64,
    pub trade_type: Direction,
    pub profit_loss: f64,
    pub time: String,
    pub reason: String,
}

impl TradeRecord {
    /// Build a record from an exit, computing P/L at the given amount.
    ///
    /// Sign convention: LONG profits when exit > entry, SHORT when
    /// entry > exit. Rounded to 4 decimal places like the log format.
    pub fn close_out(
        direction: Direction,
        entry_price: f64,
        exit_price: f64,
        amount: f64,
        reason: &str,
        time: DateTime<Utc>,
    ) -> Self {
        let raw = match direction {
            Direction::Long => (exit_price - entry_price) * amount,
            Direction::Short => (entry_price - exit_price) * amount,
        };
        Self {
            entry_price,
            exit_price,
            trade_type: direction,
            profit_loss: (raw * 10_000.0).round() / 10_000.0,
            time: time.format("%Y-%m-%d %H:%M:%S").to_string(),
            reason: reason.to_string(),
        }
    }
}

/// 30-day profit/loss summary, appended to the archive file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub start_date: String,
    pub end_date: String,
    pub total_profit_loss: f64,
    pub trade_count: usize,
    pub trades: Vec<TradeRecord>,
}

impl Summary {
    /// Summarize a batch of trades for the 30 days ending at `now`.
    pub fn from_trades(trades: Vec<TradeRecord>, now: DateTime<Utc>) -> Self {
        let total_profit_loss = trades.iter().map(|t| t.profit_loss).sum();
        Self {
            start_date: (now - Duration::days(30)).format("%Y-%m-%d").to_string(),
            end_date: now.format("%Y-%m-%d").to_string(),
            total_profit_loss,
            trade_count: trades.len(),
            trades,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_profit_loss_sign() {
        let record = TradeRecord::close_out(
            Direction::Long,
            100.0,
            103.0,
            0.01,
            "Trailing Stop Loss Hit",
            Utc::now(),
        );
        assert_eq!(record.profit_loss, 0.03);
        assert_eq!(record.trade_type, Direction::Long);
    }

    #[test]
    fn test_short_profit_loss_sign() {
        let record = TradeRecord::close_out(
            Direction::Short,
            100.0,
            103.0,
            0.01,
            "Trailing Stop Loss Hit",
            Utc::now(),
        );
        assert_eq!(record.profit_loss, -0.03);
    }

    #[test]
    fn test_profit_loss_rounded_to_4_places() {
        let record = TradeRecord::close_out(
            Direction::Long,
            100.0,
            100.123456,
            1.0,
            "Trailing Stop Loss Hit",
            Utc::now(),
        );
        assert_eq!(record.profit_loss, 0.1235);
    }

    #[test]
    fn test_direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Long).unwrap(), "\"LONG\"");
        assert_eq!(
            serde_json::to_string(&Direction::Short).unwrap(),
            "\"SHORT\""
        );
    }

    #[test]
    fn test_trade_record_field_names() {
        let record = TradeRecord::close_out(
            Direction::Long,
            100.0,
            101.0,
            0.01,
            "Trailing Stop Loss Hit",
            Utc::now(),
        );
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("entry_price").is_some());
        assert!(json.get("exit_price").is_some());
        assert_eq!(json["trade_type"], "LONG");
        assert_eq!(json["reason"], "Trailing Stop Loss Hit");
    }

    #[test]
    fn test_position_open_records_entry_metadata() {
        let position = Position::open(Direction::Long, 105.0, 100.0, EntryKind::Retracement);

        assert_eq!(position.direction, Direction::Long);
        assert_eq!(position.entry_price, 105.0);
        assert_eq!(position.stop_loss, 100.0);
        assert_eq!(position.entry_kind, EntryKind::Retracement);
    }

    #[test]
    fn test_position_held_for() {
        let entry_time = Utc::now() - Duration::seconds(90);
        let position = Position {
            id: Uuid::new_v4(),
            direction: Direction::Short,
            entry_price: 98.0,
            stop_loss: 110.0,
            entry_kind: EntryKind::Chase,
            entry_time,
        };

        let held = position.held_for(entry_time + Duration::seconds(90));
        assert_eq!(held, Duration::seconds(90));
    }

    #[test]
    fn test_summary_from_trades() {
        let now = Utc::now();
        let trades = vec![
            TradeRecord::close_out(Direction::Long, 100.0, 102.0, 0.01, "x", now),
            TradeRecord::close_out(Direction::Short, 100.0, 99.0, 0.01, "x", now),
        ];

        let summary = Summary::from_trades(trades, now);

        assert_eq!(summary.trade_count, 2);
        assert!((summary.total_profit_loss - 0.03).abs() < 1e-9);
        assert_eq!(summary.end_date, now.format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_summary_from_empty_log() {
        let summary = Summary::from_trades(vec![], Utc::now());

        assert_eq!(summary.trade_count, 0);
        assert_eq!(summary.total_profit_loss, 0.0);
        assert!(summary.trades.is_empty());
    }
}
