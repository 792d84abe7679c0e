//! Configuration for the pricing engine

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{PricerError, PricerResult};

/// How forgone dividends are credited to an early-exercised call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendCredit {
    /// Undiscounted sum of all dividends in the horizon, same at every step
    Aggregate,
    /// Dividends still to be paid after each step, discounted back to that step
    PerStep,
}

/// Fixed model parameters. These are engine constants, not request inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Continuously compounded risk-free rate
    /// Default: 0.0438
    pub risk_free_rate: f64,

    /// Volatility of variance (ξ)
    /// Default: 0.2
    pub vol_of_vol: f64,

    /// Mean reversion speed of variance (κ)
    /// Default: 5.0
    pub mean_reversion: f64,

    /// Correlation between asset and variance Brownians (ρ)
    /// Default: -0.7
    pub correlation: f64,

    /// Simulation steps per year
    /// Default: 252
    pub trading_days_per_year: u32,

    /// Lower bound on simulated variance
    /// Default: 0.01
    pub variance_floor: f64,

    /// Lower bound on a price after a dividend drop
    /// Default: 0.01
    pub price_floor: f64,

    /// Dividend credit used in the American call exercise value
    /// Default: Aggregate
    pub dividend_credit: DividendCredit,

    /// RNG seed; fresh entropy per request when unset
    pub seed: Option<u64>,

    /// Deployment bounds on requests
    pub limits: RequestLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0438,
            vol_of_vol: 0.2,
            mean_reversion: 5.0,
            correlation: -0.7,
            trading_days_per_year: 252,
            variance_floor: 0.01,
            price_floor: 0.01,
            dividend_credit: DividendCredit::Aggregate,
            seed: None,
            limits: RequestLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Default parameters with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> PricerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&json)
            .map_err(|e| PricerError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PricerResult<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(PricerError::config("risk_free_rate must be finite"));
        }
        if !(self.vol_of_vol >= 0.0 && self.vol_of_vol.is_finite()) {
            return Err(PricerError::config("vol_of_vol must be non-negative"));
        }
        if !(self.mean_reversion >= 0.0 && self.mean_reversion.is_finite()) {
            return Err(PricerError::config("mean_reversion must be non-negative"));
        }
        if !(-1.0..=1.0).contains(&self.correlation) {
            return Err(PricerError::config("correlation must be in [-1, 1]"));
        }
        if self.trading_days_per_year == 0 {
            return Err(PricerError::config("trading_days_per_year must be positive"));
        }
        if !(self.variance_floor > 0.0) {
            return Err(PricerError::config("variance_floor must be positive"));
        }
        if !(self.price_floor > 0.0) {
            return Err(PricerError::config("price_floor must be positive"));
        }
        self.limits.validate()
    }
}

/// Cost-control bounds applied to incoming requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestLimits {
    /// Longest expiry accepted, in years
    /// Default: 1.0
    pub max_time_to_expiry: f64,

    /// Default: 100
    pub min_paths: usize,

    /// Default: 10_000
    pub max_paths: usize,

    /// Rows of the path matrix returned to callers
    /// Default: 150
    pub max_sample_paths: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_time_to_expiry: 1.0,
            min_paths: 100,
            max_paths: 10_000,
            max_sample_paths: 150,
        }
    }
}

impl RequestLimits {
    pub fn validate(&self) -> PricerResult<()> {
        if !(self.max_time_to_expiry > 0.0) {
            return Err(PricerError::config("max_time_to_expiry must be positive"));
        }
        if self.min_paths == 0 || self.min_paths > self.max_paths {
            return Err(PricerError::config("path bounds must satisfy 0 < min_paths <= max_paths"));
        }
        Ok(())
    }

    /// Check a request against the deployment bounds.
    pub fn check(&self, time_to_expiry: f64, paths: usize) -> PricerResult<()> {
        if !(time_to_expiry > 0.0 && time_to_expiry <= self.max_time_to_expiry) {
            return Err(PricerError::invalid_input(format!(
                "time to expiry must be in (0, {}] years, got {}",
                self.max_time_to_expiry, time_to_expiry
            )));
        }
        if paths < self.min_paths || paths > self.max_paths {
            return Err(PricerError::invalid_input(format!(
                "number of paths must be between {} and {}, got {}",
                self.min_paths, self.max_paths, paths
            )));
        }
        Ok(())
    }
}
