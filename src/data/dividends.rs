//! Dividend history to forecast schedule

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::{DividendPayment, DividendSchedule, YIELD_REFERENCE_PRICE};

/// Payments kept from the history
pub const HISTORY_LEN: usize = 4;

pub const FORECAST_METHOD: &str = "last4_average";

/// One dividend record as a provider reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDividend {
    pub payment_date: Option<NaiveDate>,
    pub amount: f64,
}

/// Summarize the most recent payments into a forecast schedule.
///
/// Entries without a payment date or with a non-positive amount are dropped.
/// With fewer than two usable payments the schedule lists them but carries
/// no forecast metrics.
pub fn forecast_dividend_schedule(
    raw: &[RawDividend],
    valuation_date: NaiveDate,
    risk_free_rate: f64,
) -> DividendSchedule {
    let mut payments: Vec<DividendPayment> = raw
        .iter()
        .filter(|d| d.amount > 0.0 && d.amount.is_finite())
        .filter_map(|d| d.payment_date.map(|date| DividendPayment::new(date, d.amount)))
        .collect();
    payments.sort_by(|a, b| b.date.cmp(&a.date));
    payments.truncate(HISTORY_LEN);

    let mut schedule = DividendSchedule {
        schedule: payments,
        forecast_method: FORECAST_METHOD.to_string(),
        ..DividendSchedule::none()
    };

    let (Some(avg_amount), Some(avg_interval)) =
        (schedule.average_amount(), schedule.average_interval_days())
    else {
        return schedule;
    };
    if avg_interval <= 0.0 {
        return schedule;
    }

    let latest = schedule.schedule[0].date;
    let next_date = latest + Duration::days(avg_interval.round() as i64);

    schedule.annual_yield = avg_amount * (365.0 / avg_interval) / YIELD_REFERENCE_PRICE;
    schedule.present_value = avg_amount * (-risk_free_rate * avg_interval / 365.0).exp();
    schedule.next_payment = Some(DividendPayment::new(next_date, avg_amount));

    if next_date <= valuation_date {
        tracing::debug!(
            next = %next_date,
            valuation = %valuation_date,
            "forecast next dividend already passed"
        );
    }

    schedule
}
