//! Dividend handling for a single pricing request
//!
//! Turns the forecast payments inside an option's life into the per-trading-day
//! vector the simulator consumes, and collects what the caller gets back about
//! the dividends that were used.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{DividendPayment, DividendSchedule, OptionPeriodDividends};
use crate::models::step_count;

/// Cash amount per trading-day step
///
/// Payment `d` lands on index `floor(days(d) * trading_days / 365)`; dates on
/// or before the valuation date, past expiry, or beyond the grid are dropped.
/// Two payments on the same index accumulate.
pub fn dividend_day_vector(
    dividends: &[DividendPayment],
    valuation_date: NaiveDate,
    time_to_expiry: f64,
    trading_days_per_year: u32,
) -> Vec<f64> {
    let n_steps = step_count(time_to_expiry, trading_days_per_year);
    let mut days = vec![0.0; n_steps];
    let horizon_days = time_to_expiry * 365.0;

    for dividend in dividends {
        if dividend.amount <= 0.0 {
            continue;
        }
        let calendar_days = (dividend.date - valuation_date).num_days();
        if calendar_days <= 0 || calendar_days as f64 > horizon_days {
            continue;
        }
        let index = (calendar_days as f64 * trading_days_per_year as f64 / 365.0).floor() as usize;
        if let Some(slot) = days.get_mut(index) {
            *slot += dividend.amount;
        }
    }

    days
}

/// Dividend data attached to a pricing result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendInfo {
    /// Historical schedule and forecast metrics from the data layer
    #[serde(flatten)]
    pub schedule: DividendSchedule,
    /// Payments forecast inside the option's life
    pub option_period_info: OptionPeriodDividends,
    /// Continuous yield used in the closed-form price
    pub effective_yield: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_vector_length_and_placement() {
        let valuation = date(2025, 1, 1);
        let dividends = vec![
            DividendPayment::new(date(2025, 2, 15), 0.5), // 45 days -> 31
            DividendPayment::new(date(2025, 5, 16), 0.7), // 135 days -> 93
        ];
        let days = dividend_day_vector(&dividends, valuation, 0.5, 252);

        assert_eq!(days.len(), 126);
        assert_eq!(days[31], 0.5);
        assert_eq!(days[93], 0.7);
        assert!((days.iter().sum::<f64>() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_dropped() {
        let valuation = date(2025, 1, 1);
        let dividends = vec![
            DividendPayment::new(date(2024, 12, 1), 1.0),
            DividendPayment::new(date(2025, 1, 1), 1.0),
            DividendPayment::new(date(2025, 12, 1), 1.0),
            DividendPayment::new(date(2025, 2, 1), -1.0),
        ];
        let days = dividend_day_vector(&dividends, valuation, 0.25, 252);
        assert_eq!(days.len(), 63);
        assert!(days.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_last_day_of_horizon_beyond_grid() {
        // 365 calendar days maps to index 252, one past a 1-year grid
        let valuation = date(2025, 1, 1);
        let dividends = vec![DividendPayment::new(date(2026, 1, 1), 1.0)];
        let days = dividend_day_vector(&dividends, valuation, 1.0, 252);
        assert_eq!(days.len(), 252);
        assert!(days.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_same_day_accumulates() {
        let valuation = date(2025, 1, 1);
        let dividends = vec![
            DividendPayment::new(date(2025, 3, 1), 0.25),
            DividendPayment::new(date(2025, 3, 2), 0.25),
        ];
        // 59 and 60 days -> indices 40 and 41
        let days = dividend_day_vector(&dividends, valuation, 1.0, 252);
        assert_eq!(days[40], 0.25);
        assert_eq!(days[41], 0.25);

        let same = vec![
            DividendPayment::new(date(2025, 3, 1), 0.25),
            DividendPayment::new(date(2025, 3, 1), 0.25),
        ];
        let days = dividend_day_vector(&same, valuation, 1.0, 252);
        assert_eq!(days[40], 0.5);
    }
}
