//! Historical volatility from daily closes

use chrono::NaiveDate;
use ndarray::Array1;

use crate::core::{PricerError, PricerResult};

/// Annualization factor for daily returns
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Sample standard deviation of daily log returns, annualized.
///
/// `closes` must be in date order. At least two strictly positive prices
/// are required.
pub fn annualized_volatility(closes: &[(NaiveDate, f64)]) -> PricerResult<f64> {
    if closes.len() < 2 {
        return Err(PricerError::invalid_market_data(
            "need at least 2 prices to estimate volatility",
        ));
    }
    if let Some((date, price)) = closes.iter().find(|(_, p)| !(*p > 0.0 && p.is_finite())) {
        return Err(PricerError::invalid_market_data(format!(
            "non-positive close {} on {}",
            price, date
        )));
    }

    let log_returns: Array1<f64> = closes
        .windows(2)
        .map(|w| (w[1].1 / w[0].1).ln())
        .collect();

    let daily = if log_returns.len() > 1 {
        log_returns.std(1.0)
    } else {
        0.0
    };
    Ok(daily * TRADING_DAYS_PER_YEAR.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(prices: &[f64]) -> Vec<(NaiveDate, f64)> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| (start + chrono::Duration::days(i as i64), p))
            .collect()
    }

    #[test]
    fn test_constant_growth_has_zero_vol() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let vol = annualized_volatility(&series(&prices)).unwrap();
        assert!(vol.abs() < 1e-10);
    }

    #[test]
    fn test_alternating_returns() {
        // Log returns +a, -a, +a, -a
        let a = 0.01_f64;
        let prices = [100.0, 100.0 * a.exp(), 100.0, 100.0 * a.exp(), 100.0];
        let vol = annualized_volatility(&series(&prices)).unwrap();

        // Mean 0, sample variance 4a^2/3
        let expected = (4.0 * a * a / 3.0).sqrt() * 252.0_f64.sqrt();
        assert!((vol - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(annualized_volatility(&series(&[100.0])).is_err());
        assert!(annualized_volatility(&series(&[100.0, 0.0, 101.0])).is_err());
        assert!(annualized_volatility(&series(&[100.0, -5.0])).is_err());
    }
}
