use thiserror::Error;

/// Tagged bot error.
///
/// Every failure in a monitoring cycle is classified so callers can react
/// differently: market-data errors mean "skip this cycle or tick",
/// notification errors are demoted to warnings at the call site, storage
/// and unexpected errors bubble up to the scheduler's catch point.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("market data unavailable: {0}")]
    MarketData(#[source] anyhow::Error),

    #[error("notification failed: {0}")]
    Notify(#[source] anyhow::Error),

    #[error("trade storage failed: {0}")]
    Storage(#[source] anyhow::Error),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl BotError {
    pub fn market_data(err: impl Into<anyhow::Error>) -> Self {
        Self::MarketData(err.into())
    }

    pub fn notify(err: impl Into<anyhow::Error>) -> Self {
        Self::Notify(err.into())
    }

    pub fn storage(err: impl Into<anyhow::Error>) -> Self {
        Self::Storage(err.into())
    }
}
