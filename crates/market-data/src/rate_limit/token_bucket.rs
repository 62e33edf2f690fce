//! Token bucket pacing.
//!
//! One bucket shared by every outbound call: it holds up to `capacity`
//! tokens, refills at `requests_per_minute / 60` tokens per second, and each
//! paced call takes one token, waiting for a refill when the bucket is empty.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::time::Instant;

use super::RequestPacer;

#[derive(Debug)]
struct TokenBucket {
    /// Current number of available tokens.
    tokens: f64,
    /// Last time the bucket was refilled.
    last_update: Instant,
    /// Refill rate in tokens per second.
    rate: f64,
    /// Maximum number of tokens.
    capacity: f64,
}

impl TokenBucket {
    fn new(requests_per_minute: u32, capacity: f64) -> Self {
        let capacity = capacity.max(1.0);
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: (requests_per_minute.max(1) as f64) / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_until_available(&mut self) -> Duration {
        self.refill();

        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.rate)
        }
    }
}

/// Token bucket implementation of [`RequestPacer`].
#[derive(Debug)]
pub struct TokenBucketPacer {
    bucket: Mutex<TokenBucket>,
}

impl TokenBucketPacer {
    pub fn new(requests_per_minute: u32, burst_capacity: f64) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(requests_per_minute, burst_capacity)),
        }
    }

    /// Take a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.lock_bucket().try_acquire()
    }

    pub fn remaining_tokens(&self) -> f64 {
        let mut bucket = self.lock_bucket();
        bucket.refill();
        bucket.tokens
    }

    fn lock_bucket(&self) -> MutexGuard<'_, TokenBucket> {
        self.bucket.lock().unwrap_or_else(|poisoned| {
            warn!("Token bucket mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[async_trait]
impl RequestPacer for TokenBucketPacer {
    async fn pace(&self) {
        loop {
            let wait_time = {
                let mut bucket = self.lock_bucket();
                if bucket.try_acquire() {
                    return;
                }
                bucket.time_until_available()
            };

            if wait_time > Duration::ZERO {
                debug!("Pacer: waiting {:?} for a token", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_drains_to_capacity() {
        let mut bucket = TokenBucket::new(60, 3.0);

        for _ in 0..3 {
            assert!(bucket.try_acquire());
        }
        assert!(!bucket.try_acquire());
    }

    #[test]
    fn test_bucket_refills_over_time() {
        let mut bucket = TokenBucket::new(60, 1.0); // 1 token/second

        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());

        bucket.last_update -= Duration::from_secs(2);
        assert!(bucket.try_acquire());
    }

    #[test]
    fn test_refill_never_exceeds_capacity() {
        let mut bucket = TokenBucket::new(600, 2.0);
        bucket.last_update -= Duration::from_secs(60);
        bucket.refill();
        assert!((bucket.tokens - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pacer_try_acquire_and_remaining() {
        let pacer = TokenBucketPacer::new(60, 2.0);
        assert!(pacer.try_acquire());
        assert!(pacer.try_acquire());
        assert!(!pacer.try_acquire());
        assert!(pacer.remaining_tokens() < 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pace_waits_for_refill() {
        // 120/min = one token every 500ms
        let pacer = TokenBucketPacer::new(120, 1.0);
        let start = Instant::now();

        pacer.pace().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        pacer.pace().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert!(start.elapsed() < Duration::from_millis(600));
    }
}
