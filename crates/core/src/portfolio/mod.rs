//! Portfolio-level figures derived from enriched holdings.

mod summary;

pub use summary::{HoldingAllocation, PortfolioSummary, SectorSummary};
