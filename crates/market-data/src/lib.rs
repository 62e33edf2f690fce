//! Tickerfolio Market Data Crate
//!
//! Provider clients and the supporting pieces the enrichment pipeline is
//! built from.
//!
//! # Overview
//!
//! - Two providers: Yahoo Finance (primary) and Finnhub (secondary, whose
//!   positive values take precedence)
//! - A symbol-keyed quote cache with a time-to-live and an injectable clock
//! - Request pacers that space out outbound calls
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |    Provider      | --> |   QuoteFields    |  (partial, absent = None)
//! +------------------+     +------------------+
//!                                  |
//!                                  v   first positive value wins
//!                          +------------------+
//!                          |   QuoteResult    |  (merged, absent = 0)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   QuoteCache     |  (TTL, keyed by symbol)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`MarketDataProvider`] - Fetches partial quotes from one upstream
//! - [`QuoteFields`] - Partial quote, non-positive values folded into `None`
//! - [`QuoteResult`] - Merged quote in wire form
//! - [`QuoteCache`] - TTL cache of merged quotes
//! - [`RequestPacer`] - Spaces out upstream calls

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;
pub mod rate_limit;

pub use cache::{Clock, ManualClock, QuoteCache, SystemClock, DEFAULT_QUOTE_TTL_SECS};
pub use errors::MarketDataError;
pub use models::{decimal_from_f64, QuoteFields, QuoteResult};
pub use provider::finnhub::FinnhubProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{MarketDataProvider, DEFAULT_CALL_TIMEOUT};
pub use rate_limit::{
    FixedIntervalPacer, PacingStrategy, RequestPacer, TokenBucketPacer,
    DEFAULT_INTER_HOLDING_DELAY,
};
