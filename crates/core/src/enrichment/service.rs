use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use tickerfolio_market_data::RequestPacer;

use super::EnrichedHolding;
use crate::errors::Result;
use crate::holdings::Holding;
use crate::portfolio::PortfolioSummary;
use crate::quotes::QuoteResolverTrait;

#[async_trait]
pub trait EnrichmentServiceTrait: Send + Sync {
    /// Every holding with its live quote applied, in configuration order.
    ///
    /// Per-holding upstream failures show up as zero figures. An error here
    /// means the whole batch failed and no rows are returned.
    async fn get_enriched_portfolio(&self) -> Result<Vec<EnrichedHolding>>;

    /// A single holding by display name, `None` when no holding has that name.
    async fn get_enriched_holding(&self, name: &str) -> Result<Option<EnrichedHolding>>;

    /// Totals and per-sector breakdown computed from one enrichment pass.
    async fn get_portfolio_summary(&self) -> Result<PortfolioSummary>;
}

pub struct EnrichmentService {
    holdings: Vec<Holding>,
    resolver: Arc<dyn QuoteResolverTrait>,
    pacer: Arc<dyn RequestPacer>,
}

impl EnrichmentService {
    pub fn new(
        holdings: Vec<Holding>,
        resolver: Arc<dyn QuoteResolverTrait>,
        pacer: Arc<dyn RequestPacer>,
    ) -> Self {
        Self {
            holdings,
            resolver,
            pacer,
        }
    }

    async fn enrich(&self, holding: &Holding) -> Result<EnrichedHolding> {
        let quote = self
            .resolver
            .resolve(&holding.primary_symbol, &holding.secondary_symbol)
            .await?;
        EnrichedHolding::from_quote(holding, quote)
    }
}

#[async_trait]
impl EnrichmentServiceTrait for EnrichmentService {
    async fn get_enriched_portfolio(&self) -> Result<Vec<EnrichedHolding>> {
        debug!("Enriching {} holdings", self.holdings.len());

        let mut rows = Vec::with_capacity(self.holdings.len());
        for holding in &self.holdings {
            rows.push(self.enrich(holding).await?);
            self.pacer.pace().await;
        }

        let unavailable = rows.iter().filter(|row| row.cmp.is_zero()).count();
        if unavailable > 0 {
            info!(
                "Enriched {} holdings, {} without a market price",
                rows.len(),
                unavailable
            );
        } else {
            debug!("Enriched {} holdings", rows.len());
        }
        Ok(rows)
    }

    async fn get_enriched_holding(&self, name: &str) -> Result<Option<EnrichedHolding>> {
        match self.holdings.iter().find(|h| h.name == name) {
            Some(holding) => Ok(Some(self.enrich(holding).await?)),
            None => Ok(None),
        }
    }

    async fn get_portfolio_summary(&self) -> Result<PortfolioSummary> {
        let rows = self.get_enriched_portfolio().await?;
        PortfolioSummary::from_holdings(&rows)
    }
}
