//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Yahoo Finance, the primary provider (authoritative price, fallback fundamentals)
//! - Finnhub, the secondary provider whose positive values take precedence

mod traits;

pub mod finnhub;
pub mod yahoo;

use std::time::Duration;

pub use traits::MarketDataProvider;

/// Default bound on a single upstream HTTP call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);
