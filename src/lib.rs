//! # Heston MC - American and European equity option pricer
//!
//! Prices vanilla calls and puts on dividend-paying equities by simulating
//! Heston stochastic-volatility paths and valuing the same paths twice:
//! once as a European option, once as an American option through
//! Longstaff-Schwartz regression.
//!
//! ## Key Components
//!
//! - **Data**: Twelve Data closes, Alpha Vantage dividends, local cache, API quotas
//! - **Heston**: Full-truncation Euler paths with discrete dividend drops
//! - **European**: Black-Scholes closed form and terminal-payoff Monte Carlo
//! - **American**: Longstaff-Schwartz with a dividend credit for early-exercised calls
//! - **Pricing**: Engine and request service producing the JSON response
//!
//! ## Usage
//!
//! ```rust,no_run
//! use heston_mc::prelude::*;
//!
//! let snapshot = MarketSnapshot::new("VZ", 40.0, 0.2);
//! let engine = PricingEngine::new(EngineConfig::seeded(42)).unwrap();
//!
//! let result = engine
//!     .price_option(OptionType::Call, &snapshot, 40.0, 0.5, 5000)
//!     .unwrap();
//! println!("American {:.4} European {:.4}", result.american_price, result.european_price);
//! ```
//!
//! ## What This Model Does NOT Do
//!
//! - Calibrate Heston parameters to an implied volatility surface
//! - Trade or connect to a brokerage
//! - Plot paths

pub mod core;
pub mod data;
pub mod models;
pub mod pricing;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        DividendCredit, DividendPayment, DividendSchedule, EngineConfig, ErrorKind,
        MarketSnapshot, OptionPeriodDividends, OptionType, PricerError, PricerResult,
        RequestLimits,
    };

    // Market data
    pub use crate::data::{
        annualized_volatility, forecast_dividend_schedule, AlphaVantageClient, ApiLimits,
        ApiUsage, ApiUsageStats, CacheConfig, DataCache, MarketDataService, MarketDataSource,
        RawDividend, StaticMarketData, TickerData, TwelveDataClient,
    };

    // Models
    pub use crate::models::{
        norm_cdf,

        // Black-Scholes
        black_scholes::price as bs_price,

        // Heston
        HestonParams,
        HestonSimulator,
        SimulatedPaths,

        // European / American
        price_american,
        price_closed_form,
        price_from_paths,
        AmericanEstimate,
        ExerciseCredit,
        McEstimate,
    };

    // Pricing
    pub use crate::pricing::{
        PricingEngine, PricingRequest, PricingResponse, PricingResult, PricingService,
    };
}

// Re-export main types at crate root
pub use crate::core::{PricerError, PricerResult};
pub use crate::pricing::{PricingEngine, PricingService};
