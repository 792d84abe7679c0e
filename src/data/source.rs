//! Where the pricing service gets market snapshots from

use chrono::NaiveDate;

use super::alphavantage::AlphaVantageClient;
use super::cache::normalize_ticker;
use super::dividends::RawDividend;
use super::limits::ApiUsageStats;
use super::twelve::TwelveDataClient;
use crate::core::{MarketSnapshot, PricerError, PricerResult};

/// Anything that can produce a [`MarketSnapshot`] for a ticker
pub trait MarketDataSource {
    fn snapshot(&self, ticker: &str) -> PricerResult<MarketSnapshot>;

    /// Provider quota usage, for sources that call rate-limited APIs.
    fn api_usage(&self) -> Option<ApiUsageStats> {
        None
    }
}

/// Daily closing prices, oldest first
pub trait PriceProvider {
    fn closing_prices(&self, ticker: &str) -> PricerResult<Vec<(NaiveDate, f64)>>;
}

/// Raw dividend history
pub trait DividendProvider {
    fn dividends(&self, ticker: &str) -> PricerResult<Vec<RawDividend>>;
}

impl PriceProvider for TwelveDataClient {
    fn closing_prices(&self, ticker: &str) -> PricerResult<Vec<(NaiveDate, f64)>> {
        self.get_closing_prices(ticker, None)
    }
}

impl DividendProvider for AlphaVantageClient {
    fn dividends(&self, ticker: &str) -> PricerResult<Vec<RawDividend>> {
        self.get_dividends(ticker)
    }
}

/// Fixed snapshot, for offline runs and tests
#[derive(Debug, Clone)]
pub struct StaticMarketData {
    snapshot: MarketSnapshot,
}

impl StaticMarketData {
    pub fn new(snapshot: MarketSnapshot) -> Self {
        Self { snapshot }
    }
}

impl MarketDataSource for StaticMarketData {
    fn snapshot(&self, ticker: &str) -> PricerResult<MarketSnapshot> {
        if normalize_ticker(ticker) != normalize_ticker(&self.snapshot.ticker) {
            return Err(PricerError::invalid_input(format!(
                "no market data for {} (static source holds {})",
                ticker, self.snapshot.ticker
            )));
        }
        Ok(self.snapshot.clone())
    }
}
