//! Twelve Data daily closes
//!
//! Uses the `time_series` endpoint with a daily interval. The free tier
//! allows 800 requests a day; see [`super::ApiLimits`].

use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::{PricerError, PricerResult};

const BASE_URL: &str = "https://api.twelvedata.com";

/// Twelve Data API client
pub struct TwelveDataClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl TwelveDataClient {
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

    /// Daily closes, oldest first. `num_days` caps how many are returned.
    pub fn get_closing_prices(
        &self,
        ticker: &str,
        num_days: Option<usize>,
    ) -> PricerResult<Vec<(NaiveDate, f64)>> {
        let url = format!("{}/time_series", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("symbol", ticker.to_string()),
            ("interval", "1day".to_string()),
            ("apikey", self.api_key.clone()),
        ];
        if let Some(n) = num_days {
            query.push(("outputsize", n.to_string()));
        }

        tracing::info!("Fetching closing prices for {} from Twelve Data", ticker);

        let response = self.client.get(&url).query(&query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PricerError::upstream(format!(
                "Twelve Data returned HTTP {} for {}",
                status, ticker
            )));
        }
        let body = response.text()?;
        parse_time_series(&body, ticker)
    }
}

fn parse_time_series(body: &str, ticker: &str) -> PricerResult<Vec<(NaiveDate, f64)>> {
    let response: TimeSeriesResponse = serde_json::from_str(body)?;

    if response.status.as_deref() == Some("error") {
        return Err(PricerError::upstream(format!(
            "Twelve Data error for {}: {}",
            ticker,
            response.message.unwrap_or_default()
        )));
    }

    let values = response.values.ok_or_else(|| {
        PricerError::upstream(format!("Twelve Data returned no prices for {}", ticker))
    })?;

    let mut closes = Vec::with_capacity(values.len());
    for row in values {
        // Intraday rows carry a time suffix; the date is the first 10 chars
        let date_str = row.datetime.get(..10).unwrap_or(&row.datetime);
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            PricerError::Serialization(format!("bad date '{}': {}", row.datetime, e))
        })?;
        let close: f64 = row.close.trim().parse().map_err(|e| {
            PricerError::Serialization(format!("bad close '{}': {}", row.close, e))
        })?;
        closes.push((date, close));
    }

    closes.sort_by_key(|(date, _)| *date);
    Ok(closes)
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    values: Option<Vec<TimeSeriesRow>>,
    status: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesRow {
    datetime: String,
    close: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sorts_ascending() {
        let body = r#"{
            "meta": {"symbol": "VZ", "interval": "1day"},
            "values": [
                {"datetime": "2025-01-03", "open": "40.1", "close": "40.50"},
                {"datetime": "2025-01-02", "open": "39.9", "close": "40.00"},
                {"datetime": "2024-12-31", "open": "39.5", "close": "39.75"}
            ],
            "status": "ok"
        }"#;
        let closes = parse_time_series(body, "VZ").unwrap();
        assert_eq!(closes.len(), 3);
        assert_eq!(closes[0], (NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), 39.75));
        assert_eq!(closes[2].1, 40.5);
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{"code": 404, "message": "symbol not found", "status": "error"}"#;
        let err = parse_time_series(body, "NOPE").unwrap_err();
        assert!(matches!(err, PricerError::Upstream(_)));
        assert!(err.to_string().contains("symbol not found"));
    }

    #[test]
    fn test_parse_bad_close() {
        let body = r#"{"values": [{"datetime": "2025-01-02", "close": "n/a"}], "status": "ok"}"#;
        assert!(matches!(
            parse_time_series(body, "VZ"),
            Err(PricerError::Serialization(_))
        ));
    }

    #[test]
    #[ignore] // Requires network and TWELVE_API_KEY
    fn test_get_closing_prices() {
        let key = std::env::var("TWELVE_API_KEY").unwrap();
        let client = TwelveDataClient::new(key).unwrap();
        let closes = client.get_closing_prices("VZ", Some(30)).unwrap();

        assert!(!closes.is_empty());
        println!("VZ last close: {:?}", closes.last());
    }
}
