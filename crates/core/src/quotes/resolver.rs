use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use tickerfolio_market_data::{MarketDataProvider, QuoteCache, QuoteFields, QuoteResult};

use crate::errors::Result;

#[async_trait]
pub trait QuoteResolverTrait: Send + Sync {
    /// Merged quote for one holding. Upstream failures never surface here:
    /// when the primary provider cannot be reached the zero result is
    /// returned instead.
    async fn resolve(&self, primary_symbol: &str, secondary_symbol: &str) -> Result<QuoteResult>;
}

/// Cache-backed quote resolver.
///
/// The primary provider is authoritative for whether a quote exists at all.
/// Overlay providers are consulted afterwards with the secondary symbol and
/// their positive values take precedence, in ascending `priority()` order.
pub struct QuoteResolver {
    cache: Arc<QuoteCache>,
    primary: Arc<dyn MarketDataProvider>,
    overlays: Vec<Arc<dyn MarketDataProvider>>,
}

impl QuoteResolver {
    pub fn new(cache: Arc<QuoteCache>, primary: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            cache,
            primary,
            overlays: Vec::new(),
        }
    }

    pub fn with_overlay(mut self, provider: Arc<dyn MarketDataProvider>) -> Self {
        self.overlays.push(provider);
        // Stable sort keeps registration order among equal priorities
        self.overlays.sort_by_key(|p| p.priority());
        self
    }

    pub fn overlay_ids(&self) -> Vec<&'static str> {
        self.overlays.iter().map(|p| p.id()).collect()
    }

    async fn fetch_overlay(&self, provider: &dyn MarketDataProvider, symbol: &str) -> QuoteFields {
        match provider.get_quote_fields(symbol).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!(
                    "{} lookup failed for {}, falling back: {}",
                    provider.id(),
                    symbol,
                    e
                );
                QuoteFields::empty()
            }
        }
    }
}

#[async_trait]
impl QuoteResolverTrait for QuoteResolver {
    async fn resolve(&self, primary_symbol: &str, secondary_symbol: &str) -> Result<QuoteResult> {
        if let Some(cached) = self.cache.get(primary_symbol) {
            debug!("Serving cached quote for {}", primary_symbol);
            return Ok(cached);
        }

        let primary = match self.primary.get_quote_fields(primary_symbol).await {
            Ok(fields) => fields,
            Err(e) if e.is_transient() => {
                info!(
                    "{} unavailable for {}, retrying next refresh: {}",
                    self.primary.id(),
                    primary_symbol,
                    e
                );
                return Ok(QuoteResult::zero());
            }
            Err(e) => {
                warn!(
                    "{} lookup failed for {}, reporting zeros: {}",
                    self.primary.id(),
                    primary_symbol,
                    e
                );
                return Ok(QuoteResult::zero());
            }
        };

        let mut sources = Vec::with_capacity(self.overlays.len() + 1);
        for provider in &self.overlays {
            sources.push(self.fetch_overlay(provider.as_ref(), secondary_symbol).await);
        }
        sources.push(primary);

        let merged = QuoteFields::merge_first_positive(sources).into_result();
        self.cache.put(primary_symbol, merged);
        Ok(merged)
    }
}
