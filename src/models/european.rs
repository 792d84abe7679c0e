//! European valuation
//!
//! Two estimators for the same contract: the Black-Scholes closed form and
//! the discounted mean of terminal payoffs over simulated paths.

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::black_scholes;
use crate::core::{OptionType, PricerError, PricerResult};

/// Monte Carlo price with its standard error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McEstimate {
    pub price: f64,
    pub standard_error: f64,
}

impl McEstimate {
    /// Sample mean and standard error (ddof = 1) of per-path values.
    pub fn from_samples(values: ArrayView1<'_, f64>) -> PricerResult<Self> {
        let n = values.len();
        let Some(price) = values.mean() else {
            return Err(PricerError::invalid_input("no samples to average"));
        };
        let standard_error = if n > 1 {
            values.std(1.0) / (n as f64).sqrt()
        } else {
            0.0
        };
        if !price.is_finite() || !standard_error.is_finite() {
            return Err(PricerError::numerical("non-finite Monte Carlo estimate"));
        }
        Ok(Self {
            price,
            standard_error,
        })
    }
}

/// Closed-form Black-Scholes price with continuous dividend yield
pub fn price_closed_form(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    time_to_expiry: f64,
    vol: f64,
    rate: f64,
    dividend_yield: f64,
) -> PricerResult<f64> {
    if !(spot > 0.0 && spot.is_finite()) {
        return Err(PricerError::invalid_input("spot must be positive"));
    }
    if !(strike > 0.0 && strike.is_finite()) {
        return Err(PricerError::invalid_input("strike must be positive"));
    }
    if !(time_to_expiry > 0.0 && time_to_expiry.is_finite()) {
        return Err(PricerError::invalid_input("time to expiry must be positive"));
    }
    if !(vol > 0.0 && vol.is_finite()) {
        return Err(PricerError::invalid_input("volatility must be positive"));
    }
    Ok(black_scholes::price(
        spot,
        strike,
        rate,
        dividend_yield,
        vol,
        time_to_expiry,
        option_type,
    ))
}

/// Discounted terminal payoff averaged over paths
pub fn price_from_paths(
    option_type: OptionType,
    prices: &Array2<f64>,
    strike: f64,
    rate: f64,
    time_to_expiry: f64,
) -> PricerResult<McEstimate> {
    if prices.nrows() == 0 || prices.ncols() == 0 {
        return Err(PricerError::invalid_input("empty path matrix"));
    }
    let df = (-rate * time_to_expiry).exp();
    let terminal = prices.index_axis(Axis(1), prices.ncols() - 1);
    let discounted = terminal.mapv(|s| df * option_type.intrinsic(s, strike));
    McEstimate::from_samples(discounted.view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_from_paths_hand_computed() {
        // Terminal prices 90, 100, 110, 120 against K = 100
        let prices = array![[100.0, 90.0], [100.0, 100.0], [100.0, 110.0], [100.0, 120.0]];
        let est = price_from_paths(OptionType::Call, &prices, 100.0, 0.0, 1.0).unwrap();

        // Payoffs 0, 0, 10, 20: mean 7.5, sample sd sqrt(275/3)
        assert!((est.price - 7.5).abs() < 1e-12);
        let sd = (275.0_f64 / 3.0).sqrt();
        assert!((est.standard_error - sd / 2.0).abs() < 1e-12);

        let put = price_from_paths(OptionType::Put, &prices, 100.0, 0.0, 1.0).unwrap();
        assert!((put.price - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_discounting() {
        let prices = array![[100.0, 130.0], [100.0, 130.0]];
        let est = price_from_paths(OptionType::Call, &prices, 100.0, 0.05, 2.0).unwrap();
        assert!((est.price - 30.0 * (-0.1_f64).exp()).abs() < 1e-12);
        assert_eq!(est.standard_error, 0.0);
    }

    #[test]
    fn test_single_sample() {
        let est = McEstimate::from_samples(Array1::from(vec![4.0]).view()).unwrap();
        assert_eq!(est.price, 4.0);
        assert_eq!(est.standard_error, 0.0);
        assert!(McEstimate::from_samples(Array1::<f64>::zeros(0).view()).is_err());
    }

    #[test]
    fn test_closed_form_validation() {
        assert!(price_closed_form(OptionType::Call, 100.0, 0.0, 1.0, 0.2, 0.04, 0.0).is_err());
        assert!(price_closed_form(OptionType::Call, 100.0, 100.0, 0.0, 0.2, 0.04, 0.0).is_err());
        assert!(price_closed_form(OptionType::Put, 100.0, 100.0, 1.0, -0.2, 0.04, 0.0).is_err());
        assert!(price_closed_form(OptionType::Put, 100.0, 100.0, 1.0, 0.2, 0.04, 0.0).is_ok());
    }

    #[test]
    fn test_put_call_parity_closed_form() {
        let (s, k, t, vol, r, q) = (100.0, 100.0, 1.0, 0.2, 0.0438, 0.02);
        let c = price_closed_form(OptionType::Call, s, k, t, vol, r, q).unwrap();
        let p = price_closed_form(OptionType::Put, s, k, t, vol, r, q).unwrap();
        let rhs = s * (-q * t).exp() - k * (-r * t).exp();
        assert!((c - p - rhs).abs() < 1e-9);
    }
}
