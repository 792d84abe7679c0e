//! Market data fetching and storage
//!
//! Handles:
//! - Twelve Data daily closes (spot and historical volatility)
//! - Alpha Vantage dividend history and the dividend forecast
//! - Local JSON caching with separate price/dividend staleness
//! - Daily API quota tracking

pub mod alphavantage;
pub mod cache;
pub mod dividends;
pub mod limits;
pub mod service;
pub mod source;
pub mod twelve;
pub mod volatility;

pub use alphavantage::*;
pub use cache::*;
pub use dividends::*;
pub use limits::*;
pub use service::*;
pub use source::*;
pub use twelve::*;
pub use volatility::*;
