use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::{RequestPacer, DEFAULT_INTER_HOLDING_DELAY};

/// Waits the same interval on every call.
#[derive(Clone, Debug)]
pub struct FixedIntervalPacer {
    interval: Duration,
}

impl FixedIntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedIntervalPacer {
    fn default() -> Self {
        Self::new(DEFAULT_INTER_HOLDING_DELAY)
    }
}

#[async_trait]
impl RequestPacer for FixedIntervalPacer {
    async fn pace(&self) {
        if self.interval.is_zero() {
            return;
        }
        debug!("Pacer: sleeping {:?}", self.interval);
        tokio::time::sleep(self.interval).await;
    }
}
