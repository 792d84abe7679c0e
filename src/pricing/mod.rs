//! Request orchestration
//!
//! - [`engine`]: one snapshot in, American and European prices out
//! - [`service`]: request parsing, limits and market data lookup
//! - [`result`]: pricing output and its JSON shape

pub mod dividends;
pub mod engine;
pub mod result;
pub mod service;

pub use dividends::{dividend_day_vector, DividendInfo};
pub use engine::PricingEngine;
pub use result::{PricingResponse, PricingResult};
pub use service::{PricingRequest, PricingService};
