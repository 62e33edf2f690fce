//! Quote resolution for a single holding.
//!
//! [`QuoteResolver`] owns the per-holding policy: serve from the cache while
//! fresh, otherwise fetch the primary provider, lay the overlay providers on
//! top (first positive value wins) and cache the merged result.

mod resolver;


pub use resolver::{QuoteResolver, QuoteResolverTrait};
