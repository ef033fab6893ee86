/*!
 * Short-lived credential caching for free web endpoints.
 *
 * The cache is an explicit object owned by the adapter that needs it,
 * carrying an expiry timestamp. Concurrent refreshes are tolerated as
 * idempotent last-writer-wins; the scheduling model is cooperative, so no
 * finer locking is needed.
 */

use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Bearer-token cache with a freshness window
#[derive(Debug)]
pub struct BearerCache {
    slot: Mutex<Option<CachedToken>>,
    ttl: Duration,
}

impl BearerCache {
    /// Cache whose entries stay fresh for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    /// The cached token, if present and still within the freshness window
    pub fn fresh(&self) -> Option<String> {
        let slot = self.slot.lock();
        slot.as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.token.clone())
    }

    /// Store a newly fetched token (last writer wins)
    pub fn store(&self, token: String) {
        *self.slot.lock() = Some(CachedToken {
            token,
            fetched_at: Instant::now(),
        });
    }

    /// Drop the cached token, forcing the next call to refetch
    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }
}
