use crate::api::MarketData;
use crate::error::BotError;
use crate::models::Candle;
use crate::Result;
use anyhow::Context;
use chrono::DateTime;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const KRAKEN_API_BASE: &str = "https://api.kraken.com";
const RATE_LIMIT_RPS: u32 = 1; // Kraken public endpoints: ~1 request/sec

// Type alias for the rate limiter to simplify signatures
type KrakenRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Client for Kraken's public market-data REST API.
///
/// Cloneable so it can be shared; all clones share the same rate limiter.
/// Every fetch retries transient failures up to `max_retries` times with a
/// fixed backoff before surfacing a `BotError::MarketData`.
#[derive(Clone)]
pub struct KrakenClient {
    client: Client,
    base_url: String,
    rate_limiter: Arc<KrakenRateLimiter>,
    max_retries: u32,
    retry_backoff: Duration,
}

/// Envelope shared by all Kraken public endpoints
#[derive(Debug, Deserialize)]
struct KrakenResponse {
    error: Vec<String>,
    result: Option<serde_json::Value>,
}

/// One OHLC row: [time, open, high, low, close, vwap, volume, count]
/// with the numeric fields encoded as strings.
#[derive(Debug, Deserialize)]
struct OhlcRow(
    i64,
    String,
    String,
    String,
    String,
    #[allow(dead_code)] String,
    String,
    #[allow(dead_code)] u64,
);

/// Ticker payload; `c` is [last trade price, lot volume]
#[derive(Debug, Deserialize)]
struct TickerInfo {
    c: Vec<String>,
}

impl KrakenClient {
    pub fn new(max_retries: u32, retry_backoff: Duration) -> Self {
        Self::with_base_url(KRAKEN_API_BASE.to_string(), max_retries, retry_backoff)
    }

    /// Create a client against a custom base URL (used by tests).
    pub fn with_base_url(base_url: String, max_retries: u32, retry_backoff: Duration) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let quota = Quota::per_second(NonZeroU32::new(RATE_LIMIT_RPS).unwrap());

        Self {
            client,
            base_url,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            max_retries,
            retry_backoff,
        }
    }

    /// Retry wrapper: fixed backoff between attempts, tagged error on
    /// exhaustion so callers know to skip the cycle or tick.
    async fn with_retries<T, F, Fut>(&self, what: &str, mut fetch: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            self.rate_limiter.until_ready().await;

            match fetch().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!("Fetched {} after {} attempts", what, attempt);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(
                        "Error fetching {} (attempt {}/{}): {}",
                        what,
                        attempt,
                        self.max_retries,
                        e
                    );
                    last_error = Some(e);

                    if attempt < self.max_retries {
                        sleep(self.retry_backoff).await;
                    }
                }
            }
        }

        Err(BotError::market_data(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("no attempts made fetching {}", what)
        })))
    }

    async fn get(&self, url: &str) -> anyhow::Result<serde_json::Value> {
        let response: KrakenResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse Kraken response")?;

        if !response.error.is_empty() {
            anyhow::bail!("Kraken API error: {}", response.error.join(", "));
        }

        response
            .result
            .ok_or_else(|| anyhow::anyhow!("Kraken response missing result"))
    }

    async fn fetch_ohlc_once(&self, pair: &str, limit: usize) -> anyhow::Result<Vec<Candle>> {
        let url = format!(
            "{}/0/public/OHLC?pair={}&interval=1",
            self.base_url, pair
        );
        let result = self.get(&url).await?;

        // The result object is keyed by Kraken's canonical pair name plus
        // a "last" cursor; take the one array-of-rows entry.
        let rows = result
            .as_object()
            .and_then(|obj| {
                obj.iter()
                    .find(|(key, value)| *key != "last" && value.is_array())
                    .map(|(_, value)| value.clone())
            })
            .ok_or_else(|| anyhow::anyhow!("No OHLC data for pair {}", pair))?;

        let rows: Vec<OhlcRow> =
            serde_json::from_value(rows).context("Failed to parse OHLC rows")?;

        let mut candles = rows
            .into_iter()
            .map(|row| {
                Ok(Candle {
                    timestamp: DateTime::from_timestamp(row.0, 0)
                        .ok_or_else(|| anyhow::anyhow!("Invalid candle timestamp {}", row.0))?,
                    open: row.1.parse().context("bad open")?,
                    high: row.2.parse().context("bad high")?,
                    low: row.3.parse().context("bad low")?,
                    close: row.4.parse().context("bad close")?,
                    volume: row.6.parse().context("bad volume")?,
                })
            })
            .collect::<anyhow::Result<Vec<Candle>>>()?;

        // Kraken returns up to 720 rows; keep only the most recent window.
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }

        Ok(candles)
    }

    async fn fetch_ticker_once(&self, pair: &str) -> anyhow::Result<f64> {
        let url = format!("{}/0/public/Ticker?pair={}", self.base_url, pair);
        let result = self.get(&url).await?;

        let tickers: std::collections::HashMap<String, TickerInfo> =
            serde_json::from_value(result).context("Failed to parse ticker")?;

        let info = tickers
            .into_values()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No ticker data for pair {}", pair))?;

        info.c
            .first()
            .ok_or_else(|| anyhow::anyhow!("Ticker missing last trade price"))?
            .parse()
            .context("Failed to parse last trade price")
    }
}

impl MarketData for KrakenClient {
    async fn recent_candles(&self, pair: &str, limit: usize) -> Result<Vec<Candle>> {
        self.with_retries("candles", || self.fetch_ohlc_once(pair, limit))
            .await
    }

    async fn current_price(&self, pair: &str) -> Result<f64> {
        self.with_retries("price", || self.fetch_ticker_once(pair))
            .await
    }
}
