//! Pricing output types

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::dividends::DividendInfo;
use crate::core::OptionType;
use crate::data::ApiUsageStats;

/// Everything one pricing run produced
#[derive(Debug, Clone)]
pub struct PricingResult {
    pub option_type: OptionType,
    pub strike: f64,
    pub time_to_expiry: f64,
    /// Longstaff-Schwartz price
    pub american_price: f64,
    pub american_se: f64,
    /// Black-Scholes price with the effective dividend yield
    pub european_price: f64,
    /// Standard error of the simulated European price
    pub european_se: f64,
    pub european_mc_price: f64,
    pub early_exercises: usize,
    pub volatility: f64,
    pub time_grid: Array1<f64>,
    /// Shape (paths, steps)
    pub price_paths: Array2<f64>,
    pub dividend_info: DividendInfo,
}

impl PricingResult {
    pub fn total_paths(&self) -> usize {
        self.price_paths.nrows()
    }

    /// First `max_rows` paths as nested vectors.
    pub fn sample_paths(&self, max_rows: usize) -> Vec<Vec<f64>> {
        self.price_paths
            .axis_iter(Axis(0))
            .take(max_rows)
            .map(|row| row.to_vec())
            .collect()
    }
}

/// JSON body returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingResponse {
    pub us_option_price: f64,
    pub eu_option_price: f64,
    pub paths: Vec<Vec<f64>>,
    pub us_price_std: f64,
    pub eu_price_std: f64,
    pub eu_mc_price: f64,
    pub vol: f64,
    pub dividends: DividendInfo,
    pub ticker: String,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub option_type: OptionType,
    pub total_paths: usize,
    pub sampled_paths: usize,
    pub early_exercises: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub api_usage: Option<ApiUsageStats>,
}

impl PricingResponse {
    pub fn from_result(
        ticker: impl Into<String>,
        result: PricingResult,
        max_sample_paths: usize,
        api_usage: Option<ApiUsageStats>,
    ) -> Self {
        let paths = result.sample_paths(max_sample_paths);
        Self {
            us_option_price: result.american_price,
            eu_option_price: result.european_price,
            sampled_paths: paths.len(),
            total_paths: result.total_paths(),
            paths,
            us_price_std: result.american_se,
            eu_price_std: result.european_se,
            eu_mc_price: result.european_mc_price,
            vol: result.volatility,
            dividends: result.dividend_info,
            ticker: ticker.into(),
            strike: result.strike,
            time_to_expiry: result.time_to_expiry,
            option_type: result.option_type,
            early_exercises: result.early_exercises,
            api_usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn result(rows: usize) -> PricingResult {
        PricingResult {
            option_type: OptionType::Put,
            strike: 100.0,
            time_to_expiry: 0.5,
            american_price: 6.1,
            american_se: 0.08,
            european_price: 5.4,
            european_se: 0.07,
            european_mc_price: 5.5,
            early_exercises: 12,
            volatility: 0.2,
            time_grid: Array1::linspace(0.0, 0.5, 4),
            price_paths: Array::from_shape_fn((rows, 4), |(i, j)| 100.0 + (i * 4 + j) as f64),
            dividend_info: DividendInfo::default(),
        }
    }

    #[test]
    fn test_paths_truncated() {
        let response = PricingResponse::from_result("vz", result(200), 150, None);
        assert_eq!(response.total_paths, 200);
        assert_eq!(response.sampled_paths, 150);
        assert_eq!(response.paths.len(), 150);
        assert_eq!(response.paths[1], vec![104.0, 105.0, 106.0, 107.0]);

        let response = PricingResponse::from_result("vz", result(20), 150, None);
        assert_eq!(response.sampled_paths, 20);
    }

    #[test]
    fn test_json_field_names() {
        let response = PricingResponse::from_result("VZ", result(3), 150, None);
        let json = serde_json::to_value(&response).unwrap();

        for key in [
            "us_option_price",
            "eu_option_price",
            "paths",
            "us_price_std",
            "eu_price_std",
            "vol",
            "dividends",
            "ticker",
            "strike",
            "time_to_expiry",
            "option_type",
            "total_paths",
            "sampled_paths",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["option_type"], "put");
        assert!(json.get("api_usage").is_none());
        assert_eq!(json["dividends"]["forecast_method"], "none");
    }
}
