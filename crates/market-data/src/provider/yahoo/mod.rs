//! Yahoo Finance market data provider.
//!
//! Primary source for the portfolio. Per symbol it fetches, concurrently:
//! - the regular market price, through the chart API (`yahoo_finance_api`)
//! - `quoteSummary` with the `defaultKeyStatistics` and `financialData`
//!   modules, for forward P/E and trailing EPS
//!
//! `quoteSummary` requires a cookie + crumb pair, fetched once and reused
//! until Yahoo answers 401.

mod models;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, warn};
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::QuoteFields;
use crate::provider::{MarketDataProvider, DEFAULT_CALL_TIMEOUT};

use models::{YahooQuoteSummaryResponse, YahooQuoteSummaryResult};

const PROVIDER_ID: &str = "YAHOO";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SUMMARY_MODULES: &str = "defaultKeyStatistics,financialData";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    client: Client,
    timeout: Duration,
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with the default per-call timeout.
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_timeout(DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            MarketDataError::provider(
                PROVIDER_ID,
                format!("Failed to initialize Yahoo connector: {}", e),
            )
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                MarketDataError::provider(PROVIDER_ID, format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            connector,
            client,
            timeout,
            crumb: RwLock::new(None),
        })
    }

    // ========================================================================
    // Crumb/Cookie Authentication
    // ========================================================================

    fn read_crumb(&self) -> RwLockReadGuard<'_, Option<CrumbData>> {
        self.crumb.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_crumb(&self) -> RwLockWriteGuard<'_, Option<CrumbData>> {
        self.crumb.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        let cached = self.read_crumb().clone();
        if let Some(crumb) = cached {
            return Ok(crumb);
        }

        self.fetch_crumb().await
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: Get cookie from fc.yahoo.com
        let response = self
            .client
            .get("https://fc.yahoo.com")
            .send()
            .await
            .map_err(|e| transport_error("Failed to get cookie", e))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "Failed to parse Yahoo cookie"))?;

        // Step 2: Get crumb using cookie
        let crumb = self
            .client
            .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| transport_error("Failed to get crumb", e))?
            .text()
            .await
            .map_err(|e| transport_error("Failed to read crumb", e))?;

        let crumb_data = CrumbData { cookie, crumb };
        *self.write_crumb() = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        *self.write_crumb() = None;
    }

    // ========================================================================
    // Quote Fetching
    // ========================================================================

    /// Regular market price from the chart API.
    async fn fetch_market_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        let response = tokio::time::timeout(self.timeout, self.connector.get_latest_quotes(symbol, "1d"))
            .await
            .map_err(|_| MarketDataError::Timeout {
                provider: PROVIDER_ID.to_string(),
            })?
            .map_err(|e| {
                if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
                    MarketDataError::SymbolNotFound(symbol.to_string())
                } else {
                    MarketDataError::provider(PROVIDER_ID, e.to_string())
                }
            })?;

        let quote = response.last_quote().map_err(|e| {
            warn!("No quotes returned for {}: {}", symbol, e);
            MarketDataError::SymbolNotFound(symbol.to_string())
        })?;

        validate_close(symbol, quote.close)
    }

    /// Key statistics and financial data from quoteSummary.
    async fn fetch_quote_summary(
        &self,
        symbol: &str,
    ) -> Result<YahooQuoteSummaryResult, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            encode(symbol),
            SUMMARY_MODULES,
            encode(&crumb.crumb)
        );

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| transport_error("quoteSummary request failed", e))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.clear_crumb();
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                "Yahoo authentication expired",
            ));
        }

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let data: YahooQuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| transport_error("Failed to parse quoteSummary response", e))?;

        first_summary_result(symbol, data)
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    async fn get_quote_fields(&self, symbol: &str) -> Result<QuoteFields, MarketDataError> {
        debug!("Fetching quote and key statistics for {} from Yahoo", symbol);

        let (price, summary) = tokio::join!(
            self.fetch_market_price(symbol),
            self.fetch_quote_summary(symbol)
        );
        let summary = summary?;
        let price = select_price(symbol, price, &summary)?;

        Ok(QuoteFields::from_f64(
            Some(price),
            summary.forward_pe(),
            summary.trailing_eps(),
        ))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn transport_error(context: &str, e: reqwest::Error) -> MarketDataError {
    if e.is_timeout() {
        MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        }
    } else {
        MarketDataError::provider(PROVIDER_ID, format!("{}: {}", context, e))
    }
}

/// Reject chart closes that cannot be a traded price.
fn validate_close(symbol: &str, close: f64) -> Result<f64, MarketDataError> {
    if !close.is_finite() || close <= 0.0 {
        return Err(MarketDataError::ValidationFailed {
            message: format!("Invalid close price for {}: {}", symbol, close),
        });
    }
    Ok(close)
}

/// Chart price when available, otherwise `financialData.currentPrice`.
fn select_price(
    symbol: &str,
    chart: Result<f64, MarketDataError>,
    summary: &YahooQuoteSummaryResult,
) -> Result<f64, MarketDataError> {
    match chart {
        Ok(price) => Ok(price),
        Err(e) => {
            debug!(
                "Chart price fetch failed for {}: {}, using financialData",
                symbol, e
            );
            summary.current_price().ok_or(e)
        }
    }
}

/// Pull the single result out of a quoteSummary response.
fn first_summary_result(
    symbol: &str,
    data: YahooQuoteSummaryResponse,
) -> Result<YahooQuoteSummaryResult, MarketDataError> {
    if let Some(error) = data.quote_summary.error {
        let message = error
            .description
            .or(error.code)
            .unwrap_or_else(|| "Unknown quoteSummary error".to_string());
        debug!("quoteSummary error for {}: {}", symbol, message);
        return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
    }

    data.quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> YahooQuoteSummaryResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_first_summary_result() {
        let data = parse(
            r#"{"quoteSummary": {"result": [{
                "defaultKeyStatistics": {"forwardPE": {"raw": 15.0}, "trailingEps": {"raw": 2.0}}
            }], "error": null}}"#,
        );

        let result = first_summary_result("ABC", data).unwrap();
        assert_eq!(result.forward_pe(), Some(15.0));
        assert_eq!(result.trailing_eps(), Some(2.0));
    }

    #[test]
    fn test_summary_error_maps_to_symbol_not_found() {
        let data = parse(
            r#"{"quoteSummary": {"result": null, "error": {"code": "Not Found", "description": "Quote not found"}}}"#,
        );

        let err = first_summary_result("NOPE", data).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(s) if s == "NOPE"));
    }

    #[test]
    fn test_empty_summary_result_maps_to_symbol_not_found() {
        let data = parse(r#"{"quoteSummary": {"result": []}}"#);
        assert!(first_summary_result("ABC", data).is_err());
    }

    #[test]
    fn test_summary_values_become_quote_fields() {
        let data = parse(
            r#"{"quoteSummary": {"result": [{
                "defaultKeyStatistics": {"forwardPE": {"raw": -4.2}, "trailingEps": {"raw": 2.0}},
                "financialData": {"currentPrice": {"raw": 120.0}}
            }]}}"#,
        );
        let result = first_summary_result("ABC", data).unwrap();

        let fields =
            QuoteFields::from_f64(result.current_price(), result.forward_pe(), result.trailing_eps());
        // Negative P/E counts as not reported
        assert_eq!(fields.pe_ratio, None);
        assert!(fields.price.is_some());
        assert!(fields.eps.is_some());
    }

    fn summary_with_price(json: &str) -> YahooQuoteSummaryResult {
        first_summary_result("ABC", parse(json)).unwrap()
    }

    #[test]
    fn test_chart_price_wins_over_financial_data() {
        let summary = summary_with_price(
            r#"{"quoteSummary": {"result": [{"financialData": {"currentPrice": {"raw": 99.0}}}]}}"#,
        );
        assert_eq!(select_price("ABC", Ok(101.5), &summary).unwrap(), 101.5);
    }

    #[test]
    fn test_financial_data_backs_up_failed_chart() {
        let summary = summary_with_price(
            r#"{"quoteSummary": {"result": [{"financialData": {"currentPrice": {"raw": 99.0}}}]}}"#,
        );
        let chart = Err(MarketDataError::SymbolNotFound("ABC".to_string()));
        assert_eq!(select_price("ABC", chart, &summary).unwrap(), 99.0);
    }

    #[test]
    fn test_chart_error_kept_without_backup_price() {
        let summary = summary_with_price(
            r#"{"quoteSummary": {"result": [{"defaultKeyStatistics": {"forwardPE": {"raw": 15.0}}}]}}"#,
        );
        let chart = Err(MarketDataError::Timeout {
            provider: PROVIDER_ID.to_string(),
        });
        let err = select_price("ABC", chart, &summary).unwrap_err();
        assert!(matches!(err, MarketDataError::Timeout { .. }));
    }

    #[test]
    fn test_unusable_close_fails_validation() {
        assert_eq!(validate_close("ABC", 12.5).unwrap(), 12.5);
        for close in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = validate_close("ABC", close).unwrap_err();
            assert!(matches!(err, MarketDataError::ValidationFailed { .. }));
        }
    }
}
