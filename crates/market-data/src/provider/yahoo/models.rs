//! Yahoo Finance API response models.
//!
//! These models cover the quoteSummary modules the portfolio reads:
//! `defaultKeyStatistics` (forward P/E, trailing EPS) and `financialData`
//! (current price, used as a backup when the chart API fails).

use serde::Deserialize;

/// Main response wrapper for quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResponse {
    pub quote_summary: YahooQuoteSummary,
}

/// Quote summary container
#[derive(Debug, Deserialize)]
pub struct YahooQuoteSummary {
    #[serde(default)]
    pub result: Option<Vec<YahooQuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<YahooSummaryError>,
}

/// Error block Yahoo returns next to `"result": null`
#[derive(Debug, Deserialize)]
pub struct YahooSummaryError {
    pub code: Option<String>,
    pub description: Option<String>,
}

/// Individual result from quoteSummary API
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResult {
    pub default_key_statistics: Option<YahooKeyStatistics>,
    pub financial_data: Option<YahooFinancialData>,
}

/// Numeric field with raw and formatted values.
/// Yahoo sends `{}` when it has no value.
#[derive(Debug, Deserialize, Clone)]
pub struct YahooPriceDetail {
    pub raw: Option<f64>,
    // Note: fmt field exists but we only use raw values
}

/// defaultKeyStatistics module
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooKeyStatistics {
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<YahooPriceDetail>,
    pub trailing_eps: Option<YahooPriceDetail>,
    // Note: forwardEps, trailingPE live here too but are not used
}

/// financialData module
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooFinancialData {
    pub current_price: Option<YahooPriceDetail>,
}

fn raw(detail: &Option<YahooPriceDetail>) -> Option<f64> {
    detail.as_ref().and_then(|d| d.raw)
}

impl YahooQuoteSummaryResult {
    pub fn forward_pe(&self) -> Option<f64> {
        self.default_key_statistics
            .as_ref()
            .and_then(|s| raw(&s.forward_pe))
    }

    pub fn trailing_eps(&self) -> Option<f64> {
        self.default_key_statistics
            .as_ref()
            .and_then(|s| raw(&s.trailing_eps))
    }

    pub fn current_price(&self) -> Option<f64> {
        self.financial_data
            .as_ref()
            .and_then(|f| raw(&f.current_price))
    }
}
