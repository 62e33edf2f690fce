//! Outbound request pacing.
//!
//! The enrichment loop calls [`RequestPacer::pace`] after every holding it
//! resolves. How long that waits is up to the pacer, so the fetch logic does
//! not change when switching between a fixed delay and a token bucket.

mod fixed_interval;
mod token_bucket;

pub use fixed_interval::FixedIntervalPacer;
pub use token_bucket::TokenBucketPacer;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Default delay between two holdings.
pub const DEFAULT_INTER_HOLDING_DELAY: Duration = Duration::from_millis(300);

/// Spaces out calls to upstream providers.
#[async_trait]
pub trait RequestPacer: Send + Sync {
    /// Wait until the next request may go out.
    async fn pace(&self);
}

/// Pacing configuration, as read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub enum PacingStrategy {
    /// Sleep a fixed interval after every holding.
    FixedInterval(Duration),
    /// Token bucket refilled at `requests_per_minute`, bursting up to
    /// `burst_capacity`.
    TokenBucket {
        requests_per_minute: u32,
        burst_capacity: f64,
    },
}

impl Default for PacingStrategy {
    fn default() -> Self {
        Self::FixedInterval(DEFAULT_INTER_HOLDING_DELAY)
    }
}

impl PacingStrategy {
    pub fn build(&self) -> Arc<dyn RequestPacer> {
        match self {
            Self::FixedInterval(interval) => Arc::new(FixedIntervalPacer::new(*interval)),
            Self::TokenBucket {
                requests_per_minute,
                burst_capacity,
            } => Arc::new(TokenBucketPacer::new(*requests_per_minute, *burst_capacity)),
        }
    }
}
