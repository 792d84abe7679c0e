//! Request-level pricing
//!
//! Parses and bounds a [`PricingRequest`], pulls a snapshot from the market
//! data source and returns the JSON-ready [`PricingResponse`].

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::engine::PricingEngine;
use super::result::PricingResponse;
use crate::core::{OptionType, PricerResult};
use crate::data::{normalize_ticker, MarketDataSource};

/// Incoming pricing request; aliases accept the web form's field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRequest {
    pub ticker: String,
    #[serde(alias = "callOrPut")]
    pub option_type: String,
    #[serde(alias = "K")]
    pub strike: f64,
    #[serde(alias = "T")]
    pub time_to_expiry: f64,
    #[serde(alias = "numSims")]
    pub paths: usize,
}

pub struct PricingService<S: MarketDataSource> {
    engine: PricingEngine,
    source: S,
}

impl<S: MarketDataSource> PricingService<S> {
    pub fn new(engine: PricingEngine, source: S) -> Self {
        Self { engine, source }
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn price(&self, request: &PricingRequest) -> PricerResult<PricingResponse> {
        self.price_on(request, Utc::now().date_naive())
    }

    pub fn price_on(
        &self,
        request: &PricingRequest,
        valuation_date: NaiveDate,
    ) -> PricerResult<PricingResponse> {
        let option_type: OptionType = request.option_type.parse()?;
        let limits = &self.engine.config().limits;
        limits.check(request.time_to_expiry, request.paths)?;

        let ticker = normalize_ticker(&request.ticker);
        let snapshot = self.source.snapshot(&ticker)?;

        let result = self.engine.price_option_on(
            option_type,
            &snapshot,
            request.strike,
            request.time_to_expiry,
            request.paths,
            valuation_date,
        )?;

        Ok(PricingResponse::from_result(
            ticker,
            result,
            limits.max_sample_paths,
            self.source.api_usage(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineConfig, ErrorKind, MarketSnapshot};
    use crate::data::StaticMarketData;

    fn service() -> PricingService<StaticMarketData> {
        PricingService::new(
            PricingEngine::new(EngineConfig::seeded(42)).unwrap(),
            StaticMarketData::new(MarketSnapshot::new("VZ", 40.0, 0.2)),
        )
    }

    fn request(option_type: &str, time_to_expiry: f64, paths: usize) -> PricingRequest {
        PricingRequest {
            ticker: "vz".to_string(),
            option_type: option_type.to_string(),
            strike: 40.0,
            time_to_expiry,
            paths,
        }
    }

    #[test]
    fn test_price_request() {
        let response = service().price(&request(" Put ", 0.5, 400)).unwrap();
        assert_eq!(response.ticker, "VZ");
        assert_eq!(response.option_type, OptionType::Put);
        assert_eq!(response.total_paths, 400);
        assert_eq!(response.sampled_paths, 150);
        assert_eq!(response.paths[0].len(), 126);
        assert!(response.us_option_price > 0.0);
        assert!(response.api_usage.is_none());
    }

    #[test]
    fn test_request_limits() {
        let svc = service();
        for req in [
            request("call", 1.5, 1000),
            request("call", 0.0, 1000),
            request("call", 0.5, 50),
            request("call", 0.5, 20_000),
            request("straddle", 0.5, 1000),
        ] {
            let err = svc.price(&req).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn test_web_form_field_names() {
        let json = r#"{"callOrPut": "call", "ticker": "VZ", "K": 42.5, "T": 0.25, "numSims": 1000}"#;
        let req: PricingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.option_type, "call");
        assert_eq!(req.strike, 42.5);
        assert_eq!(req.paths, 1000);
    }
}
