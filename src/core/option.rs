//! Option kind definitions
//!
//! The pricer handles vanilla calls and puts. Text coming from a request is
//! parsed into [`OptionType`] once; anything other than "call"/"put" is
//! rejected rather than defaulted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{PricerError, PricerResult};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        (self.phi() * (spot - strike)).max(0.0)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = PricerError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> PricerResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            other => Err(PricerError::invalid_input(format!(
                "option kind must be \"call\" or \"put\", got \"{}\"",
                other
            ))),
        }
    }
}
