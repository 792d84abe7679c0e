//! Local market data cache
//!
//! One JSON file per ticker holding the last fetched price, volatility and
//! dividend schedule, each stamped with when it was fetched. Price and
//! dividend data go stale on different clocks.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{DividendSchedule, PricerError, PricerResult};

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Days before prices are refetched
    pub price_cache_days: i64,
    /// Days before dividends are refetched
    pub dividend_cache_days: i64,
    /// Whether to use cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            price_cache_days: 1,
            dividend_cache_days: 30,
            enabled: true,
        }
    }
}

/// Cached market data for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerData {
    pub ticker: String,
    pub price: f64,
    pub volatility: f64,
    pub dividend_schedule: Option<DividendSchedule>,
    pub last_price_update: Option<DateTime<Utc>>,
    pub last_dividend_update: Option<DateTime<Utc>>,
}

impl TickerData {
    pub fn empty(ticker: &str) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            price: 0.0,
            volatility: 0.0,
            dividend_schedule: None,
            last_price_update: None,
            last_dividend_update: None,
        }
    }

    pub fn has_price(&self) -> bool {
        self.last_price_update.is_some() && self.price > 0.0
    }
}

pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Data cache manager
pub struct DataCache {
    config: CacheConfig,
}

impl DataCache {
    pub fn new(config: CacheConfig) -> PricerResult<Self> {
        if config.enabled && !config.cache_dir.exists() {
            fs::create_dir_all(&config.cache_dir)?;
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn cache_path(&self, ticker: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{}_market.json", normalize_ticker(ticker)))
    }

    pub fn load(&self, ticker: &str) -> PricerResult<Option<TickerData>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let path = self.cache_path(ticker);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        match serde_json::from_str::<TickerData>(&json) {
            Ok(data) => {
                tracing::info!("Loaded {} from cache", data.ticker);
                Ok(Some(data))
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache file {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, data: &TickerData) -> PricerResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let path = self.cache_path(&data.ticker);
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| PricerError::Serialization(e.to_string()))?;
        fs::write(&path, json)?;

        tracing::info!("Cached market data for {} at {:?}", data.ticker, path);
        Ok(())
    }

    pub fn clear(&self, ticker: &str) -> PricerResult<()> {
        let path = self.cache_path(ticker);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Tickers with a cache file
    pub fn list_cached(&self) -> PricerResult<Vec<String>> {
        let mut tickers = Vec::new();
        if !self.config.cache_dir.exists() {
            return Ok(tickers);
        }

        for entry in fs::read_dir(&self.config.cache_dir)? {
            let file_name = entry?.file_name().to_string_lossy().to_string();
            if let Some(ticker) = file_name.strip_suffix("_market.json") {
                tickers.push(ticker.to_string());
            }
        }
        tickers.sort();
        Ok(tickers)
    }

    pub fn is_price_stale(&self, cached: Option<&TickerData>, now: DateTime<Utc>) -> bool {
        match cached.and_then(|d| d.last_price_update) {
            Some(updated) => now - updated > Duration::days(self.config.price_cache_days),
            None => true,
        }
    }

    pub fn is_dividend_stale(&self, cached: Option<&TickerData>, now: DateTime<Utc>) -> bool {
        let Some(data) = cached else {
            return true;
        };
        match (&data.dividend_schedule, data.last_dividend_update) {
            (Some(_), Some(updated)) => {
                now - updated > Duration::days(self.config.dividend_cache_days)
            }
            _ => true,
        }
    }
}
