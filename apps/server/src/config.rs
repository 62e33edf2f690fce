use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use tickerfolio_market_data::{PacingStrategy, DEFAULT_CALL_TIMEOUT, DEFAULT_QUOTE_TTL_SECS};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;
const DEFAULT_INTER_HOLDING_DELAY_MS: u64 = 300;
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 120;
const DEFAULT_BURST_CAPACITY: f64 = 5.0;

pub struct Config {
    pub listen_addr: SocketAddr,
    /// Public URL of this service, only logged
    pub backend_url: Option<String>,
    /// Without a key the secondary provider is not registered
    pub finnhub_api_key: Option<String>,
    /// Built-in holdings are used when unset
    pub holdings_file: Option<PathBuf>,
    pub cache_ttl: chrono::Duration,
    pub upstream_timeout: Duration,
    pub pacing: PacingStrategy,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut listen_addr: SocketAddr = get("TF_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("Invalid TF_LISTEN_ADDR")?;
        if let Some(port) = get("PORT") {
            listen_addr.set_port(port.parse().context("Invalid PORT")?);
        }

        let cache_ttl_secs: i64 = parse_or(&get, "TF_CACHE_TTL_SECS", DEFAULT_QUOTE_TTL_SECS)?;
        if cache_ttl_secs <= 0 {
            bail!("TF_CACHE_TTL_SECS must be positive");
        }
        let cache_ttl = chrono::Duration::try_seconds(cache_ttl_secs)
            .context("TF_CACHE_TTL_SECS out of range")?;

        let upstream_timeout_ms: u64 = parse_or(
            &get,
            "TF_UPSTREAM_TIMEOUT_MS",
            DEFAULT_CALL_TIMEOUT.as_millis() as u64,
        )?;
        if upstream_timeout_ms == 0 {
            bail!("TF_UPSTREAM_TIMEOUT_MS must be positive");
        }
        let request_timeout_ms: u64 =
            parse_or(&get, "TF_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?;

        let pacing = match get("TF_PACER").as_deref().unwrap_or("fixed") {
            "fixed" => PacingStrategy::FixedInterval(Duration::from_millis(parse_or(
                &get,
                "TF_INTER_HOLDING_DELAY_MS",
                DEFAULT_INTER_HOLDING_DELAY_MS,
            )?)),
            "token_bucket" => {
                let requests_per_minute: u32 =
                    parse_or(&get, "TF_REQUESTS_PER_MINUTE", DEFAULT_REQUESTS_PER_MINUTE)?;
                let burst_capacity: f64 =
                    parse_or(&get, "TF_BURST_CAPACITY", DEFAULT_BURST_CAPACITY)?;
                if requests_per_minute == 0 || burst_capacity.is_nan() || burst_capacity < 1.0 {
                    bail!("TF_REQUESTS_PER_MINUTE and TF_BURST_CAPACITY must be at least 1");
                }
                PacingStrategy::TokenBucket {
                    requests_per_minute,
                    burst_capacity,
                }
            }
            other => bail!("Invalid TF_PACER '{}', expected 'fixed' or 'token_bucket'", other),
        };

        let cors_allow = get("TF_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            listen_addr,
            backend_url: get("BACKEND_URL"),
            finnhub_api_key: get("FINNHUB_API_KEY"),
            holdings_file: get("TF_HOLDINGS_FILE").map(PathBuf::from),
            cache_ttl,
            upstream_timeout: Duration::from_millis(upstream_timeout_ms),
            pacing,
            cors_allow,
            request_timeout: Duration::from_millis(request_timeout_ms),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: '{}'", key, raw)),
        None => Ok(default),
    }
}
