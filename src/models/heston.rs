//! Heston Stochastic Volatility Path Simulator
//!
//! The Heston model assumes variance follows a mean-reverting square-root process:
//!
//! dS = r * S * dt + √v * S * dW_S
//! dv = κ(θ - v) * dt + σ_v * √v * dW_v
//!
//! where:
//! - S: spot price
//! - v: instantaneous variance
//! - κ: mean reversion speed
//! - θ: long-term variance
//! - σ_v: volatility of volatility (vol-of-vol)
//! - ρ: correlation between spot and variance Brownians
//!
//! Discretization is a full-truncation Euler scheme on a trading-day grid:
//! variance is floored after every step and the floored value feeds both
//! diffusion terms. The drift is the risk-free rate only; dividends enter as
//! discrete cash drops on their trading day.

use ndarray::{s, Array1, Array2, Zip};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::core::{EngineConfig, PricerError, PricerResult};

/// Heston model parameters
#[derive(Debug, Clone, Copy)]
pub struct HestonParams {
    /// Initial variance (v0)
    pub v0: f64,
    /// Mean reversion speed (κ)
    pub kappa: f64,
    /// Long-term variance (θ)
    pub theta: f64,
    /// Volatility of volatility (σ_v)
    pub sigma: f64,
    /// Correlation between spot and variance (ρ)
    pub rho: f64,
}

impl HestonParams {
    /// Create new Heston parameters
    pub fn new(v0: f64, kappa: f64, theta: f64, sigma: f64, rho: f64) -> Self {
        Self { v0, kappa, theta, sigma, rho }
    }

    /// Parameters anchored on a single observed volatility: the variance
    /// starts at and reverts to `vol²`.
    pub fn from_volatility(vol: f64, config: &EngineConfig) -> Self {
        let variance = vol * vol;
        Self {
            v0: variance,
            kappa: config.mean_reversion,
            theta: variance,
            sigma: config.vol_of_vol,
            rho: config.correlation,
        }
    }

    /// Check Feller condition: 2κθ > σ²
    pub fn feller_condition(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma * self.sigma
    }

    /// Validate parameters
    pub fn validate(&self) -> PricerResult<()> {
        if !(self.v0 > 0.0 && self.v0.is_finite()) {
            return Err(PricerError::invalid_input("v0 must be positive"));
        }
        if !(self.kappa >= 0.0 && self.kappa.is_finite()) {
            return Err(PricerError::invalid_input("kappa must be non-negative"));
        }
        if !(self.theta > 0.0 && self.theta.is_finite()) {
            return Err(PricerError::invalid_input("theta must be positive"));
        }
        if !(self.sigma >= 0.0 && self.sigma.is_finite()) {
            return Err(PricerError::invalid_input("sigma must be non-negative"));
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(PricerError::invalid_input("rho must be in [-1, 1]"));
        }
        Ok(())
    }
}

/// Number of trading-day snapshots covering `time_to_expiry`
pub fn step_count(time_to_expiry: f64, trading_days_per_year: u32) -> usize {
    (time_to_expiry * trading_days_per_year as f64).floor().max(0.0) as usize
}

/// Output of one simulation run
#[derive(Debug, Clone)]
pub struct SimulatedPaths {
    /// Evenly spaced times from 0 to expiry inclusive
    pub time_grid: Array1<f64>,
    /// Shape (paths, steps); column 0 is the spot
    pub prices: Array2<f64>,
}

impl SimulatedPaths {
    pub fn n_paths(&self) -> usize {
        self.prices.nrows()
    }

    pub fn n_steps(&self) -> usize {
        self.prices.ncols()
    }

    /// Spacing of the time grid
    pub fn dt(&self) -> f64 {
        if self.time_grid.len() < 2 {
            return 0.0;
        }
        self.time_grid[1] - self.time_grid[0]
    }
}

/// Correlated asset/variance path generator
#[derive(Debug, Clone)]
pub struct HestonSimulator {
    params: HestonParams,
    rate: f64,
    trading_days_per_year: u32,
    variance_floor: f64,
    price_floor: f64,
}

impl HestonSimulator {
    /// Simulator using the engine's rate, grid and floors.
    pub fn from_config(params: HestonParams, config: &EngineConfig) -> Self {
        Self {
            params,
            rate: config.risk_free_rate,
            trading_days_per_year: config.trading_days_per_year,
            variance_floor: config.variance_floor,
            price_floor: config.price_floor,
        }
    }

    /// Generate `n_paths` price paths.
    ///
    /// `dividend_days[t]` is the cash amount dropped from every path at step
    /// `t`; entries beyond the grid are ignored.
    pub fn generate_paths(
        &self,
        n_paths: usize,
        spot: f64,
        time_to_expiry: f64,
        dividend_days: &[f64],
        rng: &mut impl Rng,
    ) -> PricerResult<SimulatedPaths> {
        if n_paths == 0 {
            return Err(PricerError::invalid_input("number of paths must be positive"));
        }
        if !(time_to_expiry > 0.0 && time_to_expiry.is_finite()) {
            return Err(PricerError::invalid_input("time to expiry must be positive"));
        }
        if !(spot > 0.0 && spot.is_finite()) {
            return Err(PricerError::invalid_input("spot must be positive"));
        }
        if !self.rate.is_finite() {
            return Err(PricerError::invalid_input("risk-free rate must be finite"));
        }
        self.params.validate()?;
        if !self.params.feller_condition() {
            tracing::debug!(
                kappa = self.params.kappa,
                theta = self.params.theta,
                sigma = self.params.sigma,
                "Feller condition fails; variance floor will carry the low end"
            );
        }

        let n_steps = step_count(time_to_expiry, self.trading_days_per_year);
        if n_steps < 2 {
            return Err(PricerError::invalid_input(format!(
                "time to expiry {} covers {} trading day(s); at least 2 are needed",
                time_to_expiry, n_steps
            )));
        }
        let fits_in_memory = n_paths
            .checked_mul(n_steps)
            .and_then(|cells| cells.checked_mul(std::mem::size_of::<f64>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !fits_in_memory {
            return Err(PricerError::invalid_input(format!(
                "{} paths x {} steps is too large to simulate",
                n_paths, n_steps
            )));
        }

        let time_grid = Array1::linspace(0.0, time_to_expiry, n_steps);
        let dt = time_to_expiry / (n_steps - 1) as f64;
        let sqrt_dt = dt.sqrt();

        let p = self.params;
        let rho_perp = (1.0 - p.rho * p.rho).max(0.0).sqrt();
        let floor = self.variance_floor;

        let mut prices = Array2::<f64>::from_elem((n_paths, n_steps), spot);
        let mut variance = Array1::<f64>::from_elem(n_paths, p.v0);
        let mut floor_hits = 0usize;

        for t in 1..n_steps {
            let dividend = dividend_days.get(t).copied().unwrap_or(0.0);
            let (prev, next) = prices.multi_slice_mut((s![.., t - 1], s![.., t]));

            Zip::from(next)
                .and(&prev)
                .and(&mut variance)
                .for_each(|s_next, &s_prev, v| {
                    let z1: f64 = StandardNormal.sample(rng);
                    let z2: f64 = StandardNormal.sample(rng);
                    let dw_s = z1 * sqrt_dt;
                    let dw_v = (p.rho * z1 + rho_perp * z2) * sqrt_dt;

                    let vol = v.max(floor).sqrt();

                    let mut s = s_prev + self.rate * s_prev * dt + vol * s_prev * dw_s;

                    let v_next = *v + p.kappa * (p.theta - *v) * dt + p.sigma * vol * dw_v;
                    if v_next < floor {
                        floor_hits += 1;
                    }
                    *v = v_next.max(floor);

                    if dividend > 0.0 {
                        s = (s - dividend).max(self.price_floor);
                    }
                    *s_next = s;
                });
        }

        if floor_hits > 0 {
            tracing::debug!(
                floor_hits,
                total = n_paths * (n_steps - 1),
                "variance floor engaged"
            );
        }

        Ok(SimulatedPaths { time_grid, prices })
    }
}
