use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Token bucket guarding the login endpoint against credential stuffing.
///
/// Buckets are keyed per account (normalized email), so an attacker cannot
/// lock every user out by hammering one address, and a shared NAT does not
/// starve unrelated accounts. Each failed attempt consumes one token;
/// tokens refill continuously at `attempts_per_minute`. A successful login
/// resets the bucket, so legitimate users who mistype a password twice are
/// never left waiting out a window they did not earn.
pub struct LoginRateLimiter {
    buckets: Arc<DashMap<String, AttemptBucket>>,
    burst_size: u32,
    refill_per_second: f64,
    max_buckets: usize,
}

struct AttemptBucket {
    tokens: f64,
    last_refill: Instant,
    last_access: Instant,
}

/// Ceiling on tracked accounts. Past this the limiter sheds the stalest
/// buckets rather than growing without bound under a spray attack.
const DEFAULT_MAX_BUCKETS: usize = 100_000;

/// Buckets idle longer than this are dropped by the cleanup task.
const BUCKET_IDLE_EXPIRY: Duration = Duration::from_secs(30 * 60);

impl LoginRateLimiter {
    #[must_use]
    pub fn new(burst_size: u32, attempts_per_minute: u32) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            burst_size,
            refill_per_second: f64::from(attempts_per_minute) / 60.0,
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }

    /// Records an attempt against `key` and reports whether it is allowed.
    ///
    /// Callers should check this before verifying credentials, so a
    /// rate-limited attacker learns nothing about whether the password
    /// was correct.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();

        if let Some(mut bucket) = self.buckets.get_mut(key) {
            return Self::drain_token(&mut bucket, self.refill_per_second, self.burst_size, now);
        }

        if self.buckets.len() >= self.max_buckets {
            self.evict_stalest();
        }

        // First attempt for this key; burst minus the attempt being made.
        self.buckets.insert(
            key.to_string(),
            AttemptBucket {
                tokens: f64::from(self.burst_size) - 1.0,
                last_refill: now,
                last_access: now,
            },
        );
        true
    }

    /// Clears the bucket for `key` after a successful login.
    pub fn reset(&self, key: &str) {
        self.buckets.remove(key);
    }

    fn drain_token(
        bucket: &mut AttemptBucket,
        refill_per_second: f64,
        burst_size: u32,
        now: Instant,
    ) -> bool {
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * refill_per_second).min(f64::from(burst_size));
        bucket.last_refill = now;
        bucket.last_access = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Removes roughly the oldest tenth of the buckets. Only called when the
    /// map has hit `max_buckets`, which in practice means a spray attack.
    fn evict_stalest(&self) {
        let mut entries: Vec<(String, Instant)> = self
            .buckets
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().last_access))
            .collect();
        entries.sort_by_key(|(_, last_access)| *last_access);

        let to_remove = (entries.len() / 10).max(1);
        for (key, _) in entries.into_iter().take(to_remove) {
            self.buckets.remove(&key);
        }

        warn!(
            evicted = to_remove,
            limit = self.max_buckets,
            "login limiter at capacity, evicted stalest buckets"
        );
    }

    /// Number of accounts currently tracked. Surfaced for tests and the
    /// cleanup task's logging.
    #[must_use]
    pub fn tracked_accounts(&self) -> usize {
        self.buckets.len()
    }

    /// Spawns a background task that periodically drops idle buckets.
    /// Returns a handle so the caller can abort it on shutdown.
    pub fn start_cleanup_task(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let buckets = Arc::clone(&self.buckets);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let before = buckets.len();
                buckets.retain(|_, bucket| bucket.last_access.elapsed() < BUCKET_IDLE_EXPIRY);
                let removed = before - buckets.len();
                if removed > 0 {
                    debug!(removed, remaining = buckets.len(), "expired idle login buckets");
                }
            }
        })
    }
}
