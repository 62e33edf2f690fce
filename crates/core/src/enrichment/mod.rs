//! Portfolio enrichment.
//!
//! Walks the configured holdings in order, resolves a quote for each and
//! derives the per-holding figures the dashboard shows.

mod model;
mod service;


pub use model::EnrichedHolding;
pub use service::{EnrichmentService, EnrichmentServiceTrait};
