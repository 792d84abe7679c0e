//! Alpha Vantage dividend history
//!
//! Uses the `DIVIDENDS` function. Records whose payment date is missing or
//! reported as the string "None" are kept with no date and dropped later by
//! the forecaster.

use chrono::NaiveDate;
use serde::Deserialize;

use super::dividends::RawDividend;
use crate::core::{PricerError, PricerResult};

const BASE_URL: &str = "https://www.alphavantage.co";

/// Alpha Vantage API client
pub struct AlphaVantageClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>) -> PricerResult<Self> {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> PricerResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("heston_mc/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Full dividend history as reported
    pub fn get_dividends(&self, ticker: &str) -> PricerResult<Vec<RawDividend>> {
        let url = format!("{}/query", self.base_url);
        let query = [
            ("function", "DIVIDENDS"),
            ("symbol", ticker),
            ("apikey", self.api_key.as_str()),
        ];

        tracing::info!("Fetching dividends for {} from Alpha Vantage", ticker);

        let response = self.client.get(&url).query(&query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PricerError::upstream(format!(
                "Alpha Vantage returned HTTP {} for {}",
                status, ticker
            )));
        }
        let body = response.text()?;
        parse_dividends(&body, ticker)
    }
}

fn parse_dividends(body: &str, ticker: &str) -> PricerResult<Vec<RawDividend>> {
    let response: DividendsResponse = serde_json::from_str(body)?;

    if let Some(msg) = response.error_message.or(response.information).or(response.note) {
        return Err(PricerError::upstream(format!(
            "Alpha Vantage error for {}: {}",
            ticker, msg
        )));
    }

    let records = response.data.unwrap_or_default();
    let mut dividends = Vec::with_capacity(records.len());
    for record in records {
        let payment_date = record
            .payment_date
            .as_deref()
            .filter(|s| !s.is_empty() && *s != "None")
            .and_then(|s| match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::debug!("skipping unparseable payment date '{}': {}", s, e);
                    None
                }
            });
        let amount = record.amount.trim().parse::<f64>().map_err(|e| {
            PricerError::Serialization(format!("bad dividend amount '{}': {}", record.amount, e))
        })?;
        dividends.push(RawDividend {
            payment_date,
            amount,
        });
    }

    Ok(dividends)
}

#[derive(Debug, Deserialize)]
struct DividendsResponse {
    data: Option<Vec<DividendRecord>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DividendRecord {
    payment_date: Option<String>,
    amount: String,
}
