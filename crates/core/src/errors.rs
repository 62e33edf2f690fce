//! Core error types for Tickerfolio.
//!
//! Upstream provider failures are normally absorbed per holding by the quote
//! resolver. The variants here are what is left over: failures that abort a
//! whole enrichment pass or prevent the holdings from loading.

use thiserror::Error;

use tickerfolio_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Calculation failed: {0}")]
    Calculation(String),

    #[error("Invalid holdings configuration: {0}")]
    HoldingsConfig(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::HoldingsConfig(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::HoldingsConfig(err.to_string())
    }
}
