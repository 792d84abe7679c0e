//! Pricing engine
//!
//! One request in, one [`PricingResult`] out: forecast dividends, simulate a
//! single Heston path matrix and value the same paths as both a European and
//! an American option.

use chrono::{NaiveDate, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::dividends::{dividend_day_vector, DividendInfo};
use super::result::PricingResult;
use crate::core::{
    DividendCredit, EngineConfig, MarketSnapshot, OptionType, PricerError, PricerResult,
};
use crate::models::{
    price_american, price_closed_form, price_from_paths, ExerciseCredit, HestonParams,
    HestonSimulator,
};

/// Stateless pricer; each call owns its RNG and path matrix.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: EngineConfig,
}

impl PricingEngine {
    pub fn new(config: EngineConfig) -> PricerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Price with today's UTC date as the valuation date.
    pub fn price_option(
        &self,
        option_type: OptionType,
        snapshot: &MarketSnapshot,
        strike: f64,
        time_to_expiry: f64,
        n_paths: usize,
    ) -> PricerResult<PricingResult> {
        let today = Utc::now().date_naive();
        self.price_option_on(option_type, snapshot, strike, time_to_expiry, n_paths, today)
    }

    /// Price as of `valuation_date`.
    ///
    /// Failures are logged before they are returned.
    pub fn price_option_on(
        &self,
        option_type: OptionType,
        snapshot: &MarketSnapshot,
        strike: f64,
        time_to_expiry: f64,
        n_paths: usize,
        valuation_date: NaiveDate,
    ) -> PricerResult<PricingResult> {
        tracing::info!(
            ticker = %snapshot.ticker,
            option_type = %option_type,
            strike,
            time_to_expiry,
            n_paths,
            "pricing option"
        );

        let result = self.run(
            option_type,
            snapshot,
            strike,
            time_to_expiry,
            n_paths,
            valuation_date,
        );

        match &result {
            Ok(r) => tracing::info!(
                ticker = %snapshot.ticker,
                american = r.american_price,
                european = r.european_price,
                early_exercises = r.early_exercises,
                "priced option"
            ),
            Err(e) => tracing::error!(
                ticker = %snapshot.ticker,
                kind = ?e.kind(),
                "pricing failed: {}",
                e
            ),
        }

        result
    }

    fn run(
        &self,
        option_type: OptionType,
        snapshot: &MarketSnapshot,
        strike: f64,
        time_to_expiry: f64,
        n_paths: usize,
        valuation_date: NaiveDate,
    ) -> PricerResult<PricingResult> {
        if !(strike > 0.0 && strike.is_finite()) {
            return Err(PricerError::invalid_input(format!(
                "strike must be positive, got {}",
                strike
            )));
        }
        if !(time_to_expiry > 0.0 && time_to_expiry.is_finite()) {
            return Err(PricerError::invalid_input(format!(
                "time to expiry must be positive, got {}",
                time_to_expiry
            )));
        }
        if n_paths == 0 {
            return Err(PricerError::invalid_input("number of paths must be positive"));
        }
        snapshot.validate()?;

        let config = &self.config;
        let spot = snapshot.spot;
        let vol = snapshot.volatility;

        let option_period = snapshot
            .dividends
            .forecast_for_period(valuation_date, time_to_expiry);
        let dividend_days = dividend_day_vector(
            &option_period.dividends,
            valuation_date,
            time_to_expiry,
            config.trading_days_per_year,
        );
        let effective_yield = if option_period.is_empty() {
            0.0
        } else {
            snapshot.dividends.effective_yield(spot)
        };

        let simulator =
            HestonSimulator::from_config(HestonParams::from_volatility(vol, config), config);
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let paths = simulator.generate_paths(
            n_paths,
            spot,
            time_to_expiry,
            &dividend_days,
            &mut rng,
        )?;

        let european_price = price_closed_form(
            option_type,
            spot,
            strike,
            time_to_expiry,
            vol,
            config.risk_free_rate,
            effective_yield,
        )?;
        let european_mc = price_from_paths(
            option_type,
            &paths.prices,
            strike,
            config.risk_free_rate,
            time_to_expiry,
        )?;

        let credit = if option_type == OptionType::Call && option_period.total > 0.0 {
            match config.dividend_credit {
                DividendCredit::Aggregate => ExerciseCredit::aggregate(&dividend_days),
                DividendCredit::PerStep => ExerciseCredit::per_step(
                    &dividend_days,
                    paths.n_steps(),
                    config.risk_free_rate,
                    paths.dt(),
                ),
            }
        } else {
            ExerciseCredit::None
        };

        let american = price_american(
            &paths.prices,
            strike,
            config.risk_free_rate,
            time_to_expiry,
            option_type,
            &credit,
        )?;

        if !american.price.is_finite() || !european_price.is_finite() {
            return Err(PricerError::numerical("non-finite option price"));
        }

        Ok(PricingResult {
            option_type,
            strike,
            time_to_expiry,
            american_price: american.price,
            american_se: american.standard_error,
            european_price,
            european_se: european_mc.standard_error,
            european_mc_price: european_mc.price,
            early_exercises: american.early_exercises,
            volatility: vol,
            time_grid: paths.time_grid,
            price_paths: paths.prices,
            dividend_info: DividendInfo {
                schedule: snapshot.dividends.clone(),
                option_period_info: option_period,
                effective_yield,
            },
        })
    }
}
