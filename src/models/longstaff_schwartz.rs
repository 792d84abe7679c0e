//! Longstaff-Schwartz American option valuation
//!
//! Backward induction over the columns of a simulated price matrix. At each
//! step the discounted value of holding is regressed (quadratic in spot) on
//! the in-the-money paths only; a path exercises when its exercise value
//! beats that estimate, which also discards every later cashflow on it.
//!
//! Calls on dividend payers carry a dividend credit in their exercise value:
//! exercising early captures the dividends a holder would otherwise forgo.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::european::McEstimate;
use super::regression::fit_polynomial;
use crate::core::{OptionType, PricerError, PricerResult};

/// Degree of the continuation-value polynomial
pub const REGRESSION_DEGREE: usize = 2;

/// Dividend credit added to a call's exercise value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExerciseCredit {
    #[default]
    None,
    /// Same amount at every step
    Constant(f64),
    /// One amount per time step
    PerStep(Array1<f64>),
}

impl ExerciseCredit {
    /// Undiscounted total of all dividends in the horizon.
    pub fn aggregate(dividend_days: &[f64]) -> Self {
        let total: f64 = dividend_days.iter().filter(|d| **d > 0.0).sum();
        if total > 0.0 {
            ExerciseCredit::Constant(total)
        } else {
            ExerciseCredit::None
        }
    }

    /// Dividends paid strictly after each step, discounted back to it.
    pub fn per_step(dividend_days: &[f64], n_steps: usize, rate: f64, dt: f64) -> Self {
        if n_steps == 0 || !dividend_days.iter().any(|d| *d > 0.0) {
            return ExerciseCredit::None;
        }
        let df = (-rate * dt).exp();
        let mut credit = Array1::<f64>::zeros(n_steps);
        for t in (0..n_steps - 1).rev() {
            let next_dividend = dividend_days.get(t + 1).copied().unwrap_or(0.0).max(0.0);
            credit[t] = (credit[t + 1] + next_dividend) * df;
        }
        ExerciseCredit::PerStep(credit)
    }

    pub fn at(&self, step: usize) -> f64 {
        match self {
            ExerciseCredit::None => 0.0,
            ExerciseCredit::Constant(v) => *v,
            ExerciseCredit::PerStep(values) => values.get(step).copied().unwrap_or(0.0),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ExerciseCredit::None)
    }
}

/// Longstaff-Schwartz output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmericanEstimate {
    pub price: f64,
    pub standard_error: f64,
    /// Paths exercised before the final step
    pub early_exercises: usize,
    /// Steps whose regression fell back to a zero continuation value
    pub degenerate_steps: usize,
}

fn exercise_value(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    credit: f64,
) -> f64 {
    match option_type {
        OptionType::Call => (spot - strike + credit).max(0.0),
        OptionType::Put => (strike - spot).max(0.0),
    }
}

/// Price an American option on a (paths, steps) matrix.
///
/// The per-step discount uses `dt = time_to_expiry / (steps - 1)`, the spacing
/// of the simulation grid. `credit` is ignored for puts.
pub fn price_american(
    prices: &Array2<f64>,
    strike: f64,
    rate: f64,
    time_to_expiry: f64,
    option_type: OptionType,
    credit: &ExerciseCredit,
) -> PricerResult<AmericanEstimate> {
    let (n_paths, n_steps) = prices.dim();
    if n_paths == 0 {
        return Err(PricerError::invalid_input("empty path matrix"));
    }
    if n_steps < 2 {
        return Err(PricerError::invalid_input(
            "path matrix needs at least two time steps",
        ));
    }
    if !(strike > 0.0 && strike.is_finite()) {
        return Err(PricerError::invalid_input("strike must be positive"));
    }
    if !(time_to_expiry > 0.0 && time_to_expiry.is_finite()) {
        return Err(PricerError::invalid_input("time to expiry must be positive"));
    }

    let credit_at = |t: usize| match option_type {
        OptionType::Call => credit.at(t),
        OptionType::Put => 0.0,
    };

    let dt = time_to_expiry / (n_steps - 1) as f64;
    let df = (-rate * dt).exp();
    let last = n_steps - 1;

    let mut cashflow: Array1<f64> = prices
        .column(last)
        .mapv(|s| exercise_value(option_type, s, strike, credit_at(last)));
    let mut exercised_at: Vec<Option<usize>> = vec![None; n_paths];
    let mut degenerate_steps = 0usize;

    let mut itm: Vec<usize> = Vec::with_capacity(n_paths);
    let mut xs: Vec<f64> = Vec::with_capacity(n_paths);
    let mut ys: Vec<f64> = Vec::with_capacity(n_paths);

    for t in (0..last).rev() {
        let spots = prices.column(t);
        let step_credit = credit_at(t);

        // Value of holding, seen from t
        cashflow.mapv_inplace(|c| c * df);

        itm.clear();
        xs.clear();
        ys.clear();
        for (i, &s) in spots.iter().enumerate() {
            if exercise_value(option_type, s, strike, step_credit) > 0.0 {
                itm.push(i);
                xs.push(s);
                ys.push(cashflow[i]);
            }
        }
        if itm.is_empty() {
            continue;
        }

        let fit = fit_polynomial(&xs, &ys, REGRESSION_DEGREE);
        if fit.is_none() {
            degenerate_steps += 1;
            tracing::debug!(
                step = t,
                itm_paths = itm.len(),
                "continuation regression degenerate, using zero continuation"
            );
        }

        for (&i, &s) in itm.iter().zip(&xs) {
            let continuation = fit.as_ref().map(|f| f.evaluate(s)).unwrap_or(0.0);
            let exercise = exercise_value(option_type, s, strike, step_credit);
            if exercise > continuation {
                cashflow[i] = exercise;
                exercised_at[i] = Some(t);
            }
        }
    }

    let estimate = McEstimate::from_samples(cashflow.view())?;
    let early_exercises = exercised_at.iter().filter(|e| e.is_some()).count();

    Ok(AmericanEstimate {
        price: estimate.price,
        standard_error: estimate.standard_error,
        early_exercises,
        degenerate_steps,
    })
}
