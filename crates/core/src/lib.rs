//! Tickerfolio Core - holdings, quote resolution and portfolio enrichment.
//!
//! This crate turns the static list of holdings into the enriched rows the
//! dashboard polls for. Market data comes from the `tickerfolio-market-data`
//! crate; everything here is provider-agnostic and works against its traits.

pub mod constants;
pub mod enrichment;
pub mod errors;
pub mod holdings;
pub mod portfolio;
pub mod quotes;

pub use enrichment::{EnrichedHolding, EnrichmentService, EnrichmentServiceTrait};
pub use holdings::Holding;
pub use portfolio::{PortfolioSummary, SectorSummary};
pub use quotes::{QuoteResolver, QuoteResolverTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
