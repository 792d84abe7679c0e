//! Error types for the pricer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid market data: {0}")]
    InvalidMarketData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type PricerResult<T> = Result<T, PricerError>;

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    InvalidMarketData,
    /// Handled in place by a fallback; no function returns it
    NumericalDegeneracy,
    UpstreamUnavailable,
    Internal,
}

impl PricerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_market_data(msg: impl Into<String>) -> Self {
        Self::InvalidMarketData(msg.into())
    }

    pub fn numerical(msg: impl Into<String>) -> Self {
        Self::Numerical(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::Config(_) => ErrorKind::InvalidInput,
            Self::InvalidMarketData(_) => ErrorKind::InvalidMarketData,
            Self::Upstream(_) => ErrorKind::UpstreamUnavailable,
            Self::Numerical(_) | Self::IO(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }
}

impl From<reqwest::Error> for PricerError {
    fn from(e: reqwest::Error) -> Self {
        PricerError::Upstream(e.to_string())
    }
}

impl From<serde_json::Error> for PricerError {
    fn from(e: serde_json::Error) -> Self {
        PricerError::Serialization(e.to_string())
    }
}
