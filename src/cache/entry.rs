//! Cache entry with absolute expiry

use std::time::{Duration, Instant};

/// A stored response and the instant after which it is treated as absent
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
    /// `None` when `stored_at + ttl` is not representable; such entries never expire
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: now,
            expires_at: now.checked_add(ttl),
        }
    }

    /// Live while `now` is strictly before the expiry instant
    pub fn is_live(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires_at| expires_at.saturating_duration_since(now))
    }

    /// How long ago the value was stored
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }
}
