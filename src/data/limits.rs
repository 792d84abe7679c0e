//! Daily API quota tracking
//!
//! One [`ApiUsage`] is shared (behind an `Arc`) by everything that talks to
//! the providers. Counters are atomics so a handle can cross threads.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Market data providers with a daily quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    AlphaVantage,
    TwelveData,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::AlphaVantage => write!(f, "Alpha Vantage"),
            Provider::TwelveData => write!(f, "Twelve Data"),
        }
    }
}

/// Daily request quotas
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiLimits {
    /// Default: 500
    pub alphavantage_daily_limit: u32,
    /// Default: 800
    pub twelve_data_daily_limit: u32,
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            alphavantage_daily_limit: 500,
            twelve_data_daily_limit: 800,
        }
    }
}

impl ApiLimits {
    pub fn limit(&self, provider: Provider) -> u32 {
        match provider {
            Provider::AlphaVantage => self.alphavantage_daily_limit,
            Provider::TwelveData => self.twelve_data_daily_limit,
        }
    }
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUsageStats {
    pub alphavantage_used: u32,
    pub alphavantage_limit: u32,
    pub twelve_data_used: u32,
    pub twelve_data_limit: u32,
}

#[derive(Debug, Default)]
pub struct ApiUsage {
    limits: ApiLimits,
    alphavantage: AtomicU32,
    twelve_data: AtomicU32,
}

impl ApiUsage {
    pub fn new(limits: ApiLimits) -> Self {
        Self {
            limits,
            alphavantage: AtomicU32::new(0),
            twelve_data: AtomicU32::new(0),
        }
    }

    fn counter(&self, provider: Provider) -> &AtomicU32 {
        match provider {
            Provider::AlphaVantage => &self.alphavantage,
            Provider::TwelveData => &self.twelve_data,
        }
    }

    /// Whether a request would still fit in today's quota.
    pub fn has_capacity(&self, provider: Provider) -> bool {
        self.counter(provider).load(Ordering::Acquire) < self.limits.limit(provider)
    }

    /// Count one completed request. Saturates at `u32::MAX`.
    pub fn record(&self, provider: Provider) {
        let _ = self
            .counter(provider)
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(1)
            });
    }

    pub fn used(&self, provider: Provider) -> u32 {
        self.counter(provider).load(Ordering::Acquire)
    }

    pub fn stats(&self) -> ApiUsageStats {
        ApiUsageStats {
            alphavantage_used: self.used(Provider::AlphaVantage),
            alphavantage_limit: self.limits.alphavantage_daily_limit,
            twelve_data_used: self.used(Provider::TwelveData),
            twelve_data_limit: self.limits.twelve_data_daily_limit,
        }
    }

    /// Start a new day.
    pub fn reset(&self) {
        self.alphavantage.store(0, Ordering::Release);
        self.twelve_data.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_until_exhausted() {
        let usage = ApiUsage::new(ApiLimits {
            alphavantage_daily_limit: 2,
            twelve_data_daily_limit: 1,
        });

        assert!(usage.has_capacity(Provider::AlphaVantage));
        usage.record(Provider::AlphaVantage);
        assert!(usage.has_capacity(Provider::AlphaVantage));
        usage.record(Provider::AlphaVantage);
        assert!(!usage.has_capacity(Provider::AlphaVantage));

        usage.record(Provider::TwelveData);
        assert!(!usage.has_capacity(Provider::TwelveData));

        let stats = usage.stats();
        assert_eq!(stats.alphavantage_used, 2);
        assert_eq!(stats.twelve_data_used, 1);
        assert_eq!(stats.twelve_data_limit, 1);

        usage.reset();
        assert_eq!(usage.used(Provider::AlphaVantage), 0);
        assert!(usage.has_capacity(Provider::TwelveData));
    }

    #[test]
    fn test_concurrent_record_counts_every_call() {
        let usage = Arc::new(ApiUsage::new(ApiLimits {
            alphavantage_daily_limit: 500,
            twelve_data_daily_limit: 800,
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let usage = Arc::clone(&usage);
                thread::spawn(move || {
                    for _ in 0..20 {
                        usage.record(Provider::AlphaVantage);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(usage.used(Provider::AlphaVantage), 160);
        assert_eq!(usage.used(Provider::TwelveData), 0);
    }

    #[test]
    fn test_stats_json() {
        let usage = ApiUsage::default();
        let json = serde_json::to_value(usage.stats()).unwrap();
        assert_eq!(json["alphavantage_limit"], 500);
        assert_eq!(json["twelve_data_limit"], 800);
    }
}
