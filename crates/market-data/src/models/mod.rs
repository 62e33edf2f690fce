//! Market data models
//!
//! - `quote` - Merged quote ([`QuoteResult`]) and per-provider partial quote ([`QuoteFields`])

mod quote;

pub use quote::{decimal_from_f64, QuoteFields, QuoteResult};
