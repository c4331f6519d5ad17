// Market data access
pub mod kraken;

pub use kraken::KrakenClient;

use crate::models::Candle;
use crate::Result;

/// Market data source for one trading pair.
///
/// The engine only ever needs recent candles and a spot price, so this is
/// the whole seam; tests substitute scripted feeds.
pub trait MarketData {
    /// Fetch up to `limit` of the most recent 1-minute candles.
    fn recent_candles(
        &self,
        pair: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Candle>>> + Send;

    /// Fetch the last traded price.
    fn current_price(&self, pair: &str) -> impl std::future::Future<Output = Result<f64>> + Send;
}
