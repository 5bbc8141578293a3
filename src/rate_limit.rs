//! Sliding-window rate limiting.
//!
//! A local attempt counter keyed by action name, backed by the injected
//! [`KeyValueStore`]. Each check reads the persisted timestamp sequence for
//! the action, discards entries older than the window relative to "now", and
//! admits the attempt only while the remaining count is below the limit.
//! The window slides continuously on every read rather than resetting at
//! fixed boundaries; this is fixed-window-slide-on-read, not a token bucket.
//!
//! The limiter counts *attempts*, not successes: call [`RateLimiter::check`]
//! before performing the limited action, and only proceed when it returns
//! `true`. A `false` is an expected outcome, not an error; surface it to the
//! user as a generic "try again later" notice without exposing counters.
//!
//! Each check is one read-modify-write cycle against the store. In a
//! single-threaded caller this is race-free; the `&mut self` receiver makes
//! unsynchronized concurrent use a compile error rather than a data race.
//!
//! # Example
//!
//! ```
//! use formguard::rate_limit::RateLimiter;
//! use formguard::storage::MemoryStore;
//!
//! let mut limiter = RateLimiter::new(MemoryStore::new());
//! if limiter.check("login") {
//!     // perform the login attempt
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::storage::KeyValueStore;

/// Storage key prefix for rate-limit records.
pub const STORAGE_KEY_PREFIX: &str = "ratelimit_";

/// Default maximum attempts per window.
pub const DEFAULT_LIMIT: usize = 5;

/// Default window length in milliseconds.
pub const DEFAULT_WINDOW_MS: i64 = 60_000;

// =============================================================================
// CLOCK
// =============================================================================

/// Time source for the limiter, injected so tests control "now".
pub trait Clock {
    /// Current instant as unix-epoch milliseconds.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// Persisted per-action record: attempt instants, newest last.
///
/// Stored as a JSON array of unix-epoch milliseconds. After every check the
/// sequence holds only timestamps inside the trailing window, which bounds
/// its length by the limit once saturated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
struct AttemptRecord(Vec<i64>);

impl AttemptRecord {
    /// Decode a stored record; corrupt or absent data is an empty record.
    fn load(raw: Option<String>) -> Self {
        match raw {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(error = %e, "discarding corrupt rate-limit record");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Drop timestamps whose age meets or exceeds the window.
    fn prune(&mut self, now: i64, window_ms: i64) {
        self.0.retain(|&t| now - t < window_ms);
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn push(&mut self, timestamp: i64) {
        self.0.push(timestamp);
    }

    fn encode(&self) -> String {
        // Vec<i64> serialization cannot fail.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Sliding-window attempt limiter over an injected store and clock.
#[derive(Debug)]
pub struct RateLimiter<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    limit: usize,
    window_ms: i64,
}

impl<S: KeyValueStore> RateLimiter<S, SystemClock> {
    /// Create a limiter with the default limit and window over wall-clock
    /// time.
    pub fn new(store: S) -> Self {
        Self::with_limits(store, DEFAULT_LIMIT, DEFAULT_WINDOW_MS)
    }

    /// Create a limiter with a custom limit and window.
    pub fn with_limits(store: S, limit: usize, window_ms: i64) -> Self {
        Self {
            store,
            clock: SystemClock,
            limit,
            window_ms,
        }
    }

    /// Create a limiter from guard configuration.
    pub fn from_config(store: S, config: &crate::config::GuardConfig) -> Self {
        Self::with_limits(store, config.rate_limit_attempts, config.rate_limit_window_ms)
    }
}

impl<S: KeyValueStore, C: Clock> RateLimiter<S, C> {
    /// Create a limiter with an explicit clock, for deterministic tests.
    pub fn with_clock(store: S, clock: C, limit: usize, window_ms: i64) -> Self {
        Self {
            store,
            clock,
            limit,
            window_ms,
        }
    }

    /// Maximum attempts per window.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Window length in milliseconds.
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Check whether another attempt at `action` is allowed right now.
    ///
    /// On `true` the attempt is recorded. On `false` nothing new is
    /// recorded, though the stored record is still pruned to the window.
    pub fn check(&mut self, action: &str) -> bool {
        let key = storage_key(action);
        let now = self.clock.now_millis();

        let mut record = AttemptRecord::load(self.store.get(&key));
        record.prune(now, self.window_ms);

        if record.len() >= self.limit {
            debug!(action, "rate limit exceeded");
            self.store.set(&key, &record.encode());
            return false;
        }

        record.push(now);
        self.store.set(&key, &record.encode());
        trace!(action, attempts = record.len(), "attempt recorded");
        true
    }

    /// Attempts left in the current window, without recording anything.
    pub fn remaining(&self, action: &str) -> usize {
        let now = self.clock.now_millis();
        let mut record = AttemptRecord::load(self.store.get(&storage_key(action)));
        record.prune(now, self.window_ms);
        self.limit.saturating_sub(record.len())
    }

    /// Forget all recorded attempts for `action`.
    pub fn reset(&mut self, action: &str) {
        self.store.remove(&storage_key(action));
        debug!(action, "rate limit reset");
    }

    /// Consume the limiter and return the store.
    pub fn into_store(self) -> S {
        self.store
    }
}

/// Storage key for an action's rate-limit record.
pub fn storage_key(action: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{action}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Manually advanced clock.
    #[derive(Debug, Clone, Default)]
    struct ManualClock(Rc<Cell<i64>>);

    impl ManualClock {
        fn advance(&self, ms: i64) {
            self.0.set(self.0.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.0.get()
        }
    }

    fn limiter(limit: usize, window_ms: i64) -> (RateLimiter<MemoryStore, ManualClock>, ManualClock)
    {
        let clock = ManualClock::default();
        let limiter = RateLimiter::with_clock(MemoryStore::new(), clock.clone(), limit, window_ms);
        (limiter, clock)
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("login"), "ratelimit_login");
    }

    #[test]
    fn test_allows_up_to_limit_then_rejects() {
        let (mut limiter, _clock) = limiter(3, 1000);
        assert!(limiter.check("login"));
        assert!(limiter.check("login"));
        assert!(limiter.check("login"));
        assert!(!limiter.check("login"));
    }

    #[test]
    fn test_window_slides_past_old_attempts() {
        let (mut limiter, clock) = limiter(3, 1000);
        for _ in 0..3 {
            assert!(limiter.check("login"));
        }
        assert!(!limiter.check("login"));

        clock.advance(1001);
        assert!(limiter.check("login"));
    }

    #[test]
    fn test_rejection_does_not_record() {
        let (mut limiter, clock) = limiter(2, 1000);
        assert!(limiter.check("send"));
        clock.advance(500);
        assert!(limiter.check("send"));
        assert!(!limiter.check("send"));

        // The first attempt (t=0) expires at t=1000; had the rejection been
        // recorded, the window would still be full here.
        clock.advance(600);
        assert!(limiter.check("send"));
    }

    #[test]
    fn test_partial_window_expiry() {
        let (mut limiter, clock) = limiter(2, 1000);
        assert!(limiter.check("a"));
        clock.advance(800);
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));

        // First attempt ages out, second is still inside the window.
        clock.advance(300);
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
    }

    #[test]
    fn test_actions_are_independent() {
        let (mut limiter, _clock) = limiter(1, 1000);
        assert!(limiter.check("login"));
        assert!(!limiter.check("login"));
        assert!(limiter.check("signup"));
    }

    #[test]
    fn test_remaining() {
        let (mut limiter, _clock) = limiter(3, 1000);
        assert_eq!(limiter.remaining("login"), 3);
        limiter.check("login");
        assert_eq!(limiter.remaining("login"), 2);
        limiter.check("login");
        limiter.check("login");
        assert_eq!(limiter.remaining("login"), 0);
        // remaining() itself records nothing.
        assert_eq!(limiter.remaining("login"), 0);
    }

    #[test]
    fn test_reset() {
        let (mut limiter, _clock) = limiter(1, 1000);
        assert!(limiter.check("login"));
        assert!(!limiter.check("login"));
        limiter.reset("login");
        assert!(limiter.check("login"));
    }

    #[test]
    fn test_corrupt_record_treated_as_empty() {
        let mut store = MemoryStore::new();
        store.set("ratelimit_login", "definitely not json");
        let clock = ManualClock::default();
        let mut limiter = RateLimiter::with_clock(store, clock, 2, 1000);
        assert!(limiter.check("login"));
    }

    #[test]
    fn test_record_bounded_by_limit_once_saturated() {
        let (mut limiter, _clock) = limiter(3, 1000);
        for _ in 0..10 {
            limiter.check("login");
        }
        let store = limiter.into_store();
        let record: Vec<i64> =
            serde_json::from_str(&store.get("ratelimit_login").unwrap()).unwrap();
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_stale_entries_replaced_in_store() {
        let (mut limiter, clock) = limiter(1, 1000);
        assert!(limiter.check("a"));
        clock.advance(2000);
        // Window empty again; the stored stale entry must not count.
        assert!(limiter.check("a"));
        let store = limiter.into_store();
        let record: Vec<i64> =
            serde_json::from_str(&store.get("ratelimit_a").unwrap()).unwrap();
        assert_eq!(record, vec![2000]);
    }

    #[test]
    fn test_rejection_persists_pruned_record_without_recording() {
        let (mut limiter, clock) = limiter(1, 1000);
        assert!(limiter.check("a"));
        clock.advance(500);
        assert!(!limiter.check("a"));

        let store = limiter.into_store();
        let record: Vec<i64> =
            serde_json::from_str(&store.get("ratelimit_a").unwrap()).unwrap();
        assert_eq!(record, vec![0]);
    }

    #[test]
    fn test_from_config() {
        let config = crate::config::GuardConfig::strict();
        let limiter = RateLimiter::from_config(MemoryStore::new(), &config);
        assert_eq!(limiter.limit(), 3);
        assert_eq!(limiter.window_ms(), 300_000);
    }

    #[test]
    fn test_default_limits() {
        let limiter = RateLimiter::new(MemoryStore::new());
        assert_eq!(limiter.limit(), DEFAULT_LIMIT);
        assert_eq!(limiter.window_ms(), DEFAULT_WINDOW_MS);
    }
}
