//! In-memory quote cache with time-based expiry.
//!
//! Entries are keyed by symbol and stamped with the time they were fetched.
//! An entry is served only while `now - fetched_at < ttl`; past that it is
//! reported as a miss but kept until a successful refetch overwrites it.
//! Nothing is ever evicted, the key space is the fixed set of holdings.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};

use crate::models::QuoteResult;

/// Default time-to-live for cached quotes, in seconds.
pub const DEFAULT_QUOTE_TTL_SECS: i64 = 5 * 60;

#[derive(Clone, Debug)]
struct CacheEntry {
    value: QuoteResult,
    fetched_at: DateTime<Utc>,
}

/// Symbol-keyed cache of merged quotes.
///
/// Safe to share between tasks; concurrent writers to the same key resolve
/// as last-writer-wins.
pub struct QuoteCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl QuoteCache {
    /// Cache with the default five minute TTL, reading the wall clock.
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_QUOTE_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value for `key`, if it was fetched less than one TTL ago.
    pub fn get(&self, key: &str) -> Option<QuoteResult> {
        let now = self.clock.now();
        let entries = self.lock_entries();
        let entry = entries.get(key)?;

        if now - entry.fetched_at < self.ttl {
            Some(entry.value)
        } else {
            debug!(
                "Quote cache: entry for '{}' expired (fetched at {})",
                key, entry.fetched_at
            );
            None
        }
    }

    /// Store `value` under `key`, stamped with the current time.
    pub fn put(&self, key: &str, value: QuoteResult) {
        let fetched_at = self.clock.now();
        let mut entries = self.lock_entries();
        entries.insert(key.to_string(), CacheEntry { value, fetched_at });
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Quote cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn cache_with_clock() -> (QuoteCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        ));
        let cache = QuoteCache::with_clock(Duration::seconds(DEFAULT_QUOTE_TTL_SECS), clock.clone());
        (cache, clock)
    }

    fn sample() -> QuoteResult {
        QuoteResult::new(dec!(120), dec!(15), dec!(2))
    }

    #[test]
    fn test_get_after_put_within_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put("ABC", sample());

        clock.advance(Duration::minutes(4) + Duration::seconds(59));
        assert_eq!(cache.get("ABC"), Some(sample()));
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put("ABC", sample());

        clock.advance(cache.ttl());
        assert_eq!(cache.get("ABC"), None);
        // Stale entries are superseded, not deleted
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_key_is_a_miss() {
        let (cache, _) = cache_with_clock();
        assert!(cache.is_empty());
        assert_eq!(cache.get("NOPE"), None);
    }

    #[test]
    fn test_put_overwrites_and_restamps() {
        let (cache, clock) = cache_with_clock();
        cache.put("ABC", sample());

        clock.advance(Duration::minutes(6));
        let refreshed = QuoteResult::new(dec!(121), dec!(15), dec!(2));
        cache.put("ABC", refreshed);

        clock.advance(Duration::minutes(1));
        assert_eq!(cache.get("ABC"), Some(refreshed));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let (cache, clock) = cache_with_clock();
        cache.put("ABC", sample());
        clock.advance(Duration::minutes(3));
        cache.put("XYZ", QuoteResult::zero());

        clock.advance(Duration::minutes(3));
        assert_eq!(cache.get("ABC"), None);
        assert_eq!(cache.get("XYZ"), Some(QuoteResult::zero()));
    }
}
