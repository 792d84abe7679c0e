//! Pricing Models
//!
//! Implements:
//! - Heston path simulation (full-truncation Euler, discrete dividends)
//! - Black-Scholes closed form
//! - European valuation (closed form and terminal-path Monte Carlo)
//! - Longstaff-Schwartz American valuation

pub mod black_scholes;
pub mod european;
pub mod heston;
pub mod longstaff_schwartz;
pub mod regression;

pub use black_scholes::norm_cdf;
pub use european::*;
pub use heston::*;
pub use longstaff_schwartz::*;
pub use regression::*;
