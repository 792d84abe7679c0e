//! Core data types for the pricer
//!
//! Defines fundamental types:
//! - OptionType: call/put with case-insensitive parsing
//! - DividendSchedule: known payments and forecast metrics
//! - MarketSnapshot: spot, volatility and dividends for one underlying
//! - EngineConfig: fixed model parameters and request limits

pub mod config;
pub mod dividend;
pub mod error;
pub mod market;
pub mod option;

pub use config::*;
pub use dividend::*;
pub use error::*;
pub use market::*;
pub use option::*;
