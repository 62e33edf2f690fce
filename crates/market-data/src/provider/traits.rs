//! Market data provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::QuoteFields;

/// A source of price and fundamentals for a symbol.
///
/// Implementations fetch whatever subset of price, P/E and EPS the upstream
/// service reports and return it as [`QuoteFields`], with missing values left
/// as `None`. Any transport or parsing failure is returned as an error; it is
/// up to the caller to decide whether that failure is fatal for the symbol.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tickerfolio_market_data::{MarketDataError, MarketDataProvider, QuoteFields};
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for FixedProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn get_quote_fields(&self, _symbol: &str) -> Result<QuoteFields, MarketDataError> {
///         Ok(QuoteFields::from_f64(Some(100.0), Some(12.0), Some(8.0)))
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "YAHOO" or "FINNHUB".
    ///
    /// Used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering overlay sources.
    ///
    /// Lower values = higher precedence. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Fetch current price and fundamentals for `symbol`, given in this
    /// provider's own symbol format.
    async fn get_quote_fields(&self, symbol: &str) -> Result<QuoteFields, MarketDataError>;
}
