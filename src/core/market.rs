//! Market snapshot consumed by the pricing engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DividendSchedule, PricerError, PricerResult};

/// Spot, volatility and dividends for one underlying at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Underlying symbol
    pub ticker: String,
    /// Last close
    pub spot: f64,
    /// Annualized volatility
    pub volatility: f64,
    /// Known dividends and forecast metrics
    pub dividends: DividendSchedule,
    /// When the snapshot was assembled
    pub timestamp: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn new(ticker: impl Into<String>, spot: f64, volatility: f64) -> Self {
        Self {
            ticker: ticker.into(),
            spot,
            volatility,
            dividends: DividendSchedule::none(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_dividends(mut self, dividends: DividendSchedule) -> Self {
        self.dividends = dividends;
        self
    }

    /// Reject snapshots the engine must not price against.
    pub fn validate(&self) -> PricerResult<()> {
        if !self.spot.is_finite() || self.spot <= 0.0 {
            return Err(PricerError::invalid_market_data(format!(
                "invalid spot price for {}: {}",
                self.ticker, self.spot
            )));
        }
        if !self.volatility.is_finite() || self.volatility <= 0.0 {
            return Err(PricerError::invalid_market_data(format!(
                "invalid volatility for {}: {}",
                self.ticker, self.volatility
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(MarketSnapshot::new("VZ", 40.0, 0.2).validate().is_ok());

        let bad = [
            (0.0, 0.2),
            (-1.0, 0.2),
            (40.0, 0.0),
            (f64::NAN, 0.2),
            (40.0, f64::INFINITY),
        ];
        for (spot, vol) in bad {
            let err = MarketSnapshot::new("VZ", spot, vol).validate().unwrap_err();
            assert!(matches!(err, PricerError::InvalidMarketData(_)));
        }
    }
}
