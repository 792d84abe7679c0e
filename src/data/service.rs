//! Cached, quota-aware market data
//!
//! [`MarketDataService`] answers from the cache while it is fresh, refetches
//! prices and dividends independently when they go stale, and falls back to
//! whatever is cached when a provider fails or its quota is spent.

use std::sync::Arc;

use chrono::Utc;

use super::alphavantage::AlphaVantageClient;
use super::cache::{normalize_ticker, CacheConfig, DataCache, TickerData};
use super::dividends::forecast_dividend_schedule;
use super::limits::{ApiLimits, ApiUsage, ApiUsageStats, Provider};
use super::source::{DividendProvider, MarketDataSource, PriceProvider};
use super::twelve::TwelveDataClient;
use super::volatility::annualized_volatility;
use crate::core::{DividendSchedule, MarketSnapshot, PricerError, PricerResult};

pub const ALPHAVANTAGE_KEY_VAR: &str = "ALPHAVANTAGE_API_KEY";
pub const TWELVE_KEY_VAR: &str = "TWELVE_API_KEY";

pub struct MarketDataService<P = TwelveDataClient, D = AlphaVantageClient> {
    prices: P,
    dividends: D,
    cache: DataCache,
    usage: Arc<ApiUsage>,
    risk_free_rate: f64,
}

impl MarketDataService {
    /// Live providers keyed from the environment.
    pub fn from_env(
        cache: CacheConfig,
        limits: ApiLimits,
        risk_free_rate: f64,
    ) -> PricerResult<Self> {
        let twelve_key = std::env::var(TWELVE_KEY_VAR)
            .map_err(|_| PricerError::config(format!("{} is not set", TWELVE_KEY_VAR)))?;
        let alpha_key = std::env::var(ALPHAVANTAGE_KEY_VAR)
            .map_err(|_| PricerError::config(format!("{} is not set", ALPHAVANTAGE_KEY_VAR)))?;

        Self::new(
            TwelveDataClient::new(twelve_key)?,
            AlphaVantageClient::new(alpha_key)?,
            cache,
            Arc::new(ApiUsage::new(limits)),
            risk_free_rate,
        )
    }
}

impl<P: PriceProvider, D: DividendProvider> MarketDataService<P, D> {
    pub fn new(
        prices: P,
        dividends: D,
        cache: CacheConfig,
        usage: Arc<ApiUsage>,
        risk_free_rate: f64,
    ) -> PricerResult<Self> {
        Ok(Self {
            prices,
            dividends,
            cache: DataCache::new(cache)?,
            usage,
            risk_free_rate,
        })
    }

    pub fn usage(&self) -> Arc<ApiUsage> {
        Arc::clone(&self.usage)
    }

    /// Current record for `ticker`, refreshed where stale and written back.
    pub fn ticker_data(&self, ticker: &str) -> PricerResult<TickerData> {
        let ticker = normalize_ticker(ticker);
        let now = Utc::now();

        let cached = self.cache.load(&ticker)?;
        if cached.is_none() {
            tracing::info!("No cached data for {}", ticker);
        }

        let mut price_stale = self.cache.is_price_stale(cached.as_ref(), now);
        let mut dividend_stale = self.cache.is_dividend_stale(cached.as_ref(), now);

        if price_stale && !self.usage.has_capacity(Provider::TwelveData) {
            tracing::warn!(
                "{} quota exhausted; using cached price for {}",
                Provider::TwelveData,
                ticker
            );
            price_stale = false;
        }
        if dividend_stale && !self.usage.has_capacity(Provider::AlphaVantage) {
            tracing::warn!(
                "{} quota exhausted; using cached dividends for {}",
                Provider::AlphaVantage,
                ticker
            );
            dividend_stale = false;
        }

        let mut data = cached.clone().unwrap_or_else(|| TickerData::empty(&ticker));

        if price_stale {
            match self.fetch_price(&ticker) {
                Ok((price, volatility)) => {
                    self.usage.record(Provider::TwelveData);
                    tracing::info!("{} close {:.2}, volatility {:.4}", ticker, price, volatility);
                    data.price = price;
                    data.volatility = volatility;
                    data.last_price_update = Some(now);
                }
                Err(e) if cached.is_some() => {
                    tracing::warn!("Price fetch for {} failed, using cache: {}", ticker, e);
                }
                Err(e) => {
                    return Err(PricerError::upstream(format!(
                        "no cached data for {} and price fetch failed: {}",
                        ticker, e
                    )));
                }
            }
        }

        if dividend_stale {
            match self.fetch_dividends(&ticker) {
                Ok(schedule) => {
                    self.usage.record(Provider::AlphaVantage);
                    tracing::info!(
                        "{} dividends: {} recent payments",
                        ticker,
                        schedule.schedule.len()
                    );
                    data.dividend_schedule = Some(schedule);
                    data.last_dividend_update = Some(now);
                }
                Err(e) if cached.is_some() => {
                    tracing::warn!("Dividend fetch for {} failed, using cache: {}", ticker, e);
                }
                Err(e) => {
                    return Err(PricerError::upstream(format!(
                        "no cached data for {} and dividend fetch failed: {}",
                        ticker, e
                    )));
                }
            }
        }

        let fetched_anything =
            data.last_price_update.is_some() || data.last_dividend_update.is_some();
        if fetched_anything && cached.as_ref() != Some(&data) {
            self.cache.save(&data)?;
        }
        Ok(data)
    }

    fn fetch_price(&self, ticker: &str) -> PricerResult<(f64, f64)> {
        let closes = self.prices.closing_prices(ticker)?;
        let &(_, last) = closes
            .last()
            .ok_or_else(|| PricerError::upstream(format!("no closing prices for {}", ticker)))?;
        let volatility = annualized_volatility(&closes)?;
        Ok((last, volatility))
    }

    fn fetch_dividends(&self, ticker: &str) -> PricerResult<DividendSchedule> {
        let raw = self.dividends.dividends(ticker)?;
        Ok(forecast_dividend_schedule(
            &raw,
            Utc::now().date_naive(),
            self.risk_free_rate,
        ))
    }
}

impl<P: PriceProvider, D: DividendProvider> MarketDataSource for MarketDataService<P, D> {
    fn snapshot(&self, ticker: &str) -> PricerResult<MarketSnapshot> {
        let data = self.ticker_data(ticker)?;
        if !data.has_price() {
            return Err(PricerError::upstream(format!(
                "no price available for {}",
                data.ticker
            )));
        }

        let timestamp = data.last_price_update.unwrap_or_else(Utc::now);
        let snapshot = MarketSnapshot {
            ticker: data.ticker,
            spot: data.price,
            volatility: data.volatility,
            dividends: data.dividend_schedule.unwrap_or_default(),
            timestamp,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn api_usage(&self) -> Option<ApiUsageStats> {
        Some(self.usage.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::data::RawDividend;
    use chrono::{Duration, NaiveDate};
    use std::cell::Cell;
    use tempfile::tempdir;

    struct FakePrices {
        closes: Option<Vec<(NaiveDate, f64)>>,
        calls: Cell<usize>,
    }

    impl FakePrices {
        fn ok() -> Self {
            let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
            let closes = [40.0, 40.4, 40.1, 40.6, 40.3]
                .iter()
                .enumerate()
                .map(|(i, &p)| (start + Duration::days(i as i64), p))
                .collect();
            Self {
                closes: Some(closes),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                closes: None,
                calls: Cell::new(0),
            }
        }
    }

    impl PriceProvider for FakePrices {
        fn closing_prices(&self, ticker: &str) -> PricerResult<Vec<(NaiveDate, f64)>> {
            self.calls.set(self.calls.get() + 1);
            self.closes
                .clone()
                .ok_or_else(|| PricerError::upstream(format!("down for {}", ticker)))
        }
    }

    struct FakeDividends {
        fail: bool,
        calls: Cell<usize>,
    }

    impl DividendProvider for FakeDividends {
        fn dividends(&self, _ticker: &str) -> PricerResult<Vec<RawDividend>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(PricerError::upstream("down"));
            }
            Ok(vec![
                RawDividend {
                    payment_date: NaiveDate::from_ymd_opt(2025, 5, 1),
                    amount: 0.68,
                },
                RawDividend {
                    payment_date: NaiveDate::from_ymd_opt(2025, 2, 1),
                    amount: 0.68,
                },
            ])
        }
    }

    fn service(
        dir: &std::path::Path,
        prices: FakePrices,
        fail_dividends: bool,
        limits: ApiLimits,
    ) -> MarketDataService<FakePrices, FakeDividends> {
        MarketDataService::new(
            prices,
            FakeDividends {
                fail: fail_dividends,
                calls: Cell::new(0),
            },
            CacheConfig {
                cache_dir: dir.to_path_buf(),
                ..Default::default()
            },
            Arc::new(ApiUsage::new(limits)),
            0.0438,
        )
        .unwrap()
    }

    #[test]
    fn test_fetch_then_cache_hit() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path(), FakePrices::ok(), false, ApiLimits::default());

        let snap = svc.snapshot("vz").unwrap();
        assert_eq!(snap.ticker, "VZ");
        assert_eq!(snap.spot, 40.3);
        assert!(snap.volatility > 0.0);
        assert_eq!(snap.dividends.schedule.len(), 2);
        assert_eq!(svc.prices.calls.get(), 1);

        // Fresh cache: no second fetch, no extra quota
        let again = svc.snapshot("VZ").unwrap();
        assert_eq!(again.spot, snap.spot);
        assert_eq!(svc.prices.calls.get(), 1);

        let stats = svc.api_usage().unwrap();
        assert_eq!(stats.twelve_data_used, 1);
        assert_eq!(stats.alphavantage_used, 1);
    }

    #[test]
    fn test_provider_failure_without_cache() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path(), FakePrices::failing(), false, ApiLimits::default());
        let err = svc.snapshot("VZ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[test]
    fn test_provider_failure_falls_back_to_cache() {
        let dir = tempdir().unwrap();
        let cache = DataCache::new(CacheConfig {
            cache_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        let stale = TickerData {
            price: 39.0,
            volatility: 0.2,
            last_price_update: Some(Utc::now() - Duration::days(3)),
            dividend_schedule: Some(DividendSchedule::none()),
            last_dividend_update: Some(Utc::now()),
            ..TickerData::empty("VZ")
        };
        cache.save(&stale).unwrap();

        let svc = service(dir.path(), FakePrices::failing(), true, ApiLimits::default());
        let snap = svc.snapshot("VZ").unwrap();
        assert_eq!(snap.spot, 39.0);
        assert_eq!(svc.prices.calls.get(), 1);
    }

    #[test]
    fn test_quota_exhausted_skips_refresh() {
        let dir = tempdir().unwrap();
        let limits = ApiLimits {
            alphavantage_daily_limit: 0,
            twelve_data_daily_limit: 0,
        };
        let svc = service(dir.path(), FakePrices::ok(), false, limits);

        // Nothing cached and no quota: no price to price against
        let err = svc.snapshot("VZ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(svc.prices.calls.get(), 0);
    }

    #[test]
    fn test_failed_price_fetch_spends_no_quota() {
        let dir = tempdir().unwrap();
        let limits = ApiLimits {
            alphavantage_daily_limit: 1,
            twelve_data_daily_limit: 5,
        };
        let svc = service(dir.path(), FakePrices::failing(), false, limits);

        let err = svc.snapshot("VZ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(svc.prices.calls.get(), 1);
        assert_eq!(svc.dividends.calls.get(), 0);

        let stats = svc.api_usage().unwrap();
        assert_eq!(stats.twelve_data_used, 0);
        assert_eq!(stats.alphavantage_used, 0);
    }

    #[test]
    fn test_failed_dividend_fetch_spends_no_quota() {
        let dir = tempdir().unwrap();
        let cache = DataCache::new(CacheConfig {
            cache_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        let stale = TickerData {
            price: 39.0,
            volatility: 0.2,
            last_price_update: Some(Utc::now() - Duration::days(3)),
            ..TickerData::empty("VZ")
        };
        cache.save(&stale).unwrap();

        let svc = service(dir.path(), FakePrices::ok(), true, ApiLimits::default());
        let snap = svc.snapshot("VZ").unwrap();
        assert_eq!(snap.spot, 40.3);
        assert_eq!(svc.dividends.calls.get(), 1);

        let stats = svc.api_usage().unwrap();
        assert_eq!(stats.twelve_data_used, 1);
        assert_eq!(stats.alphavantage_used, 0);
    }
}
