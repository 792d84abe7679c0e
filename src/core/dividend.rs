//! Dividend schedule types
//!
//! A [`DividendSchedule`] holds the last few known cash payments (most recent
//! first) together with the summary metrics the forecaster derived from them.
//! [`DividendSchedule::forecast_for_period`] projects those payments forward
//! across an option's life.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fallback spacing between payments when the history cannot provide one.
pub const DEFAULT_DIVIDEND_INTERVAL_DAYS: i64 = 90;

/// Reference price the annual yield estimate is quoted against.
pub const YIELD_REFERENCE_PRICE: f64 = 100.0;

/// A single cash dividend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendPayment {
    pub date: NaiveDate,
    pub amount: f64,
}

impl DividendPayment {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Historical dividends plus forecast metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendSchedule {
    /// Known payments, most recent first
    pub schedule: Vec<DividendPayment>,
    /// Present value of the next forecast payment
    pub present_value: f64,
    /// Annualized dividend divided by [`YIELD_REFERENCE_PRICE`]
    pub annual_yield: f64,
    /// Next forecast payment, if the history allows one
    pub next_payment: Option<DividendPayment>,
    /// How the metrics were produced
    pub forecast_method: String,
}

impl Default for DividendSchedule {
    fn default() -> Self {
        Self::none()
    }
}

impl DividendSchedule {
    /// Schedule for a non-dividend-paying underlying
    pub fn none() -> Self {
        Self {
            schedule: Vec::new(),
            present_value: 0.0,
            annual_yield: 0.0,
            next_payment: None,
            forecast_method: "none".to_string(),
        }
    }

    /// Build from raw payments; sorts most-recent-first. Metrics are left at zero.
    pub fn from_payments(mut payments: Vec<DividendPayment>) -> Self {
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        Self {
            schedule: payments,
            forecast_method: "manual".to_string(),
            ..Self::none()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    /// Mean payment amount
    pub fn average_amount(&self) -> Option<f64> {
        if self.schedule.is_empty() {
            return None;
        }
        let total: f64 = self.schedule.iter().map(|d| d.amount).sum();
        Some(total / self.schedule.len() as f64)
    }

    /// Mean calendar days between consecutive payments
    pub fn average_interval_days(&self) -> Option<f64> {
        if self.schedule.len() < 2 {
            return None;
        }
        let intervals: Vec<i64> = self
            .schedule
            .windows(2)
            .map(|w| (w[0].date - w[1].date).num_days().abs())
            .collect();
        Some(intervals.iter().sum::<i64>() as f64 / intervals.len() as f64)
    }

    /// Continuous yield implied by `annual_yield`, rescaled to `spot`.
    pub fn effective_yield(&self, spot: f64) -> f64 {
        if self.annual_yield <= 0.0 || spot <= 0.0 {
            return 0.0;
        }
        self.annual_yield * YIELD_REFERENCE_PRICE / spot
    }

    /// Project payments across `(valuation_date, valuation_date + T]`.
    ///
    /// Needs at least two historical payments. Projection starts at the most
    /// recent known date and steps by the average interval; each projected
    /// payment carries the average amount.
    pub fn forecast_for_period(
        &self,
        valuation_date: NaiveDate,
        time_to_expiry: f64,
    ) -> OptionPeriodDividends {
        let (Some(avg_amount), Some(avg_interval)) =
            (self.average_amount(), self.average_interval_days())
        else {
            return OptionPeriodDividends::default();
        };

        let mut step = avg_interval.round() as i64;
        if step <= 0 {
            step = DEFAULT_DIVIDEND_INTERVAL_DAYS;
        }
        let step = Duration::days(step);

        let period_end = valuation_date + Duration::days((time_to_expiry * 365.0).floor() as i64);
        let Some(mut forecast_date) = self.schedule.iter().map(|d| d.date).max() else {
            return OptionPeriodDividends::default();
        };

        let mut dividends = Vec::new();
        while forecast_date <= period_end {
            forecast_date += step;
            if forecast_date > valuation_date && forecast_date <= period_end {
                dividends.push(DividendPayment::new(forecast_date, avg_amount));
            }
        }

        OptionPeriodDividends::new(dividends)
    }
}

/// Dividends forecast to fall inside an option's life
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionPeriodDividends {
    /// Forecast payments, earliest first
    pub dividends: Vec<DividendPayment>,
    pub total: f64,
    pub count: usize,
}

impl OptionPeriodDividends {
    pub fn new(dividends: Vec<DividendPayment>) -> Self {
        let total = dividends.iter().map(|d| d.amount).sum();
        let count = dividends.len();
        Self { dividends, total, count }
    }

    pub fn is_empty(&self) -> bool {
        self.dividends.is_empty()
    }
}
