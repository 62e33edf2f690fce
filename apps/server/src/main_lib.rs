use std::sync::Arc;

use tickerfolio_core::{
    holdings::{default_holdings, load_holdings_file, Holding},
    EnrichmentService, EnrichmentServiceTrait, QuoteResolver,
};
use tickerfolio_market_data::{FinnhubProvider, QuoteCache, YahooProvider};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub enrichment_service: Arc<dyn EnrichmentServiceTrait>,
}

impl AppState {
    pub fn new(enrichment_service: Arc<dyn EnrichmentServiceTrait>) -> Arc<Self> {
        Arc::new(Self { enrichment_service })
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("TF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn load_holdings(config: &Config) -> anyhow::Result<Vec<Holding>> {
    match &config.holdings_file {
        Some(path) => Ok(load_holdings_file(path)?),
        None => {
            tracing::info!("TF_HOLDINGS_FILE not set, using the built-in holdings");
            Ok(default_holdings())
        }
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let holdings = load_holdings(config)?;

    let cache = Arc::new(QuoteCache::with_ttl(config.cache_ttl));
    let yahoo = YahooProvider::with_timeout(config.upstream_timeout)?;
    let mut resolver = QuoteResolver::new(cache, Arc::new(yahoo));

    match &config.finnhub_api_key {
        Some(key) => {
            resolver = resolver.with_overlay(Arc::new(FinnhubProvider::with_timeout(
                key.clone(),
                config.upstream_timeout,
            )));
        }
        None => tracing::warn!("FINNHUB_API_KEY not set, quotes come from Yahoo only"),
    }

    tracing::info!(
        "Serving {} holdings, overlays: {:?}, pacing: {:?}",
        holdings.len(),
        resolver.overlay_ids(),
        config.pacing
    );

    let enrichment_service = Arc::new(EnrichmentService::new(
        holdings,
        Arc::new(resolver),
        config.pacing.build(),
    ));

    Ok(AppState::new(enrichment_service))
}
