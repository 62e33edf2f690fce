//! Finnhub market data provider implementation.
//!
//! Secondary source for the portfolio: its positive values take precedence
//! over Yahoo's. Two endpoints are used per symbol, queried concurrently:
//! - `/quote` for the current price (`c`)
//! - `/stock/metric?metric=all` for normalized annual P/E and EPS
//!
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::QuoteFields;
use crate::provider::{MarketDataProvider, DEFAULT_CALL_TIMEOUT};

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    // Note: d, dp, h, l, o, pc, t exist but are not used here
}

/// Response from /stock/metric endpoint
#[derive(Debug, Deserialize)]
struct MetricResponse {
    #[serde(default)]
    metric: Option<Metrics>,
}

/// The subset of `metric` we read. Finnhub sends dozens of keys, many null.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metrics {
    pe_normalized_annual: Option<f64>,
    eps_normalized_annual: Option<f64>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub market data provider.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key and the default
    /// per-call timeout.
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at another host (a proxy or a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Make a GET request to the Finnhub API.
    ///
    /// The token travels as the `token` query parameter, like every other
    /// parameter.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::provider(PROVIDER_ID, format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                "Invalid or missing API key",
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status, &body));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::provider(PROVIDER_ID, format!("Failed to read response: {}", e))
            }
        })
    }

    /// Current price from /quote.
    async fn fetch_price(&self, symbol: &str) -> Result<Option<f64>, MarketDataError> {
        let text = self.fetch("/quote", &[("symbol", symbol)]).await?;
        parse_quote(&text)
    }

    /// Normalized annual (P/E, EPS) from /stock/metric.
    async fn fetch_metrics(&self, symbol: &str) -> Result<(Option<f64>, Option<f64>), MarketDataError> {
        let text = self
            .fetch("/stock/metric", &[("symbol", symbol), ("metric", "all")])
            .await?;
        parse_metrics(&text)
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    async fn get_quote_fields(&self, symbol: &str) -> Result<QuoteFields, MarketDataError> {
        debug!("Fetching quote and metrics for {} from Finnhub", symbol);

        let (price, (pe_ratio, eps)) =
            tokio::try_join!(self.fetch_price(symbol), self.fetch_metrics(symbol))?;

        Ok(QuoteFields::from_f64(price, pe_ratio, eps))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_quote(text: &str) -> Result<Option<f64>, MarketDataError> {
    let response: QuoteResponse = serde_json::from_str(text).map_err(|e| {
        MarketDataError::provider(PROVIDER_ID, format!("Failed to parse quote response: {}", e))
    })?;
    Ok(response.c)
}

fn parse_metrics(text: &str) -> Result<(Option<f64>, Option<f64>), MarketDataError> {
    let response: MetricResponse = serde_json::from_str(text).map_err(|e| {
        MarketDataError::provider(PROVIDER_ID, format!("Failed to parse metric response: {}", e))
    })?;
    let metrics = response.metric.unwrap_or_default();
    Ok((metrics.pe_normalized_annual, metrics.eps_normalized_annual))
}

fn error_from_body(status: reqwest::StatusCode, body: &str) -> MarketDataError {
    if let Ok(ErrorResponse { error: Some(message) }) = serde_json::from_str::<ErrorResponse>(body) {
        return MarketDataError::provider(PROVIDER_ID, message);
    }
    MarketDataError::provider(PROVIDER_ID, format!("HTTP {} - {}", status, body))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_provider_id_and_priority() {
        let provider = FinnhubProvider::new("test_key".to_string());
        assert_eq!(provider.id(), "FINNHUB");
        assert_eq!(provider.priority(), 1);
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let provider =
            FinnhubProvider::new("test_key".to_string()).with_base_url("http://localhost:9000/");
        assert_eq!(provider.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_quote_response_parsing() {
        let json = r#"{
            "c": 1642.35,
            "d": 11.2,
            "dp": 0.6866,
            "h": 1650.0,
            "l": 1628.1,
            "o": 1630.0,
            "pc": 1631.15,
            "t": 1717061400
        }"#;

        assert_eq!(parse_quote(json).unwrap(), Some(1642.35));
    }

    #[test]
    fn test_quote_response_without_price() {
        assert_eq!(parse_quote("{}").unwrap(), None);
        assert_eq!(parse_quote(r#"{"c": null}"#).unwrap(), None);
    }

    #[test]
    fn test_metric_response_parsing() {
        let json = r#"{
            "metric": {
                "10DayAverageTradingVolume": 14.2,
                "52WeekHigh": 1794.0,
                "peNormalizedAnnual": 18.42,
                "epsNormalizedAnnual": 89.1,
                "beta": null
            },
            "metricType": "all",
            "series": {},
            "symbol": "HDFCBANK.NS"
        }"#;

        let (pe, eps) = parse_metrics(json).unwrap();
        assert_eq!(pe, Some(18.42));
        assert_eq!(eps, Some(89.1));
    }

    #[test]
    fn test_metric_response_missing_fields_default_to_absent() {
        let (pe, eps) = parse_metrics(r#"{"metric": {}}"#).unwrap();
        assert_eq!((pe, eps), (None, None));

        // Unknown symbols come back without a metric object at all
        let (pe, eps) = parse_metrics(r#"{"metricType": "all", "symbol": "NOPE"}"#).unwrap();
        assert_eq!((pe, eps), (None, None));
    }

    #[test]
    fn test_malformed_body_is_provider_error() {
        let err = parse_quote("<html>Bad gateway</html>").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { .. }));
    }

    #[test]
    fn test_error_body_message_is_surfaced() {
        let err = error_from_body(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error": "Symbol not supported"}"#,
        );
        assert_eq!(
            err.to_string(),
            "Provider error: FINNHUB - Symbol not supported"
        );

        let err = error_from_body(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(
            err.to_string(),
            "Provider error: FINNHUB - HTTP 502 Bad Gateway - upstream down"
        );
    }

    // ------------------------------------------------------------------------
    // HTTP behavior against a local stub server
    // ------------------------------------------------------------------------

    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Responder = fn(&str) -> (u16, &'static str);

    /// Serves canned responses keyed on the request path and records every
    /// request line it sees.
    async fn stub_server(respond: Responder) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => raw.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&raw);
                let line = request.lines().next().unwrap_or_default().to_string();
                let path = line.split_whitespace().nth(1).unwrap_or_default();
                let path = path.split('?').next().unwrap_or_default().to_string();
                log.lock().unwrap().push(line);

                let (status, body) = respond(&path);
                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), seen)
    }

    fn provider_for(base_url: String) -> FinnhubProvider {
        FinnhubProvider::new("k".to_string()).with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_quote_and_metrics_are_combined() {
        let (url, seen) = stub_server(|path| match path {
            "/quote" => (200, r#"{"c": 125.0, "pc": 120.0}"#),
            "/stock/metric" => (
                200,
                r#"{"metric": {"peNormalizedAnnual": 18.0, "epsNormalizedAnnual": 2.5}}"#,
            ),
            _ => (404, "{}"),
        })
        .await;

        let fields = provider_for(url).get_quote_fields("ABC:NSE").await.unwrap();
        assert_eq!(fields.price, Some(dec!(125)));
        assert_eq!(fields.pe_ratio, Some(dec!(18)));
        assert_eq!(fields.eps, Some(dec!(2.5)));

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&"GET /quote?symbol=ABC%3ANSE&token=k HTTP/1.1".to_string()));
        assert!(seen.contains(
            &"GET /stock/metric?symbol=ABC%3ANSE&metric=all&token=k HTTP/1.1".to_string()
        ));
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limited() {
        let (url, _) = stub_server(|_| (429, r#"{"error": "API limit reached"}"#)).await;

        let err = provider_for(url).get_quote_fields("ABC").await.unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unauthorized_is_an_api_key_error() {
        let (url, _) = stub_server(|_| (401, "")).await;

        let err = provider_for(url).get_quote_fields("ABC").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Provider error: FINNHUB - Invalid or missing API key"
        );
    }

    #[tokio::test]
    async fn test_forbidden_surfaces_the_error_message() {
        let (url, _) =
            stub_server(|_| (403, r#"{"error": "You don't have access to this resource."}"#)).await;

        let err = provider_for(url).get_quote_fields("ABC").await.unwrap_err();
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "Provider error: FINNHUB - You don't have access to this resource."
        );
    }

    #[tokio::test]
    async fn test_metric_failure_fails_the_whole_fetch() {
        let (url, _) = stub_server(|path| match path {
            "/quote" => (200, r#"{"c": 125.0}"#),
            _ => (500, "boom"),
        })
        .await;

        let err = provider_for(url).get_quote_fields("ABC").await.unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { .. }));
    }
}
