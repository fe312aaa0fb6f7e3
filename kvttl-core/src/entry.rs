use std::time::{Duration, Instant};

/// Longest TTL honoured (~100 years). Larger values are clamped so that
/// `Instant + ttl` cannot overflow.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Represents a stored value with its optional expiration time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    /// Creates an entry that never expires
    pub fn new(value: V) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Creates an entry that expires at the given instant
    pub fn with_expiry(value: V, expires_at: Instant) -> Self {
        Self {
            value,
            expires_at: Some(expires_at),
        }
    }

    /// Creates an entry that expires `ttl` from now
    pub fn with_ttl(value: V, ttl: Duration) -> Self {
        Self::with_expiry(value, deadline(Instant::now(), ttl))
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    /// Returns the expiration time, `None` if the entry never expires
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Replaces the stored value, leaving the expiry untouched
    pub(crate) fn set_value(&mut self, value: V) {
        self.value = value;
    }

    /// Sets (or replaces) the expiry to `ttl` after `now`
    pub(crate) fn set_ttl_at(&mut self, now: Instant, ttl: Duration) {
        self.expires_at = Some(deadline(now, ttl));
    }

    /// Checks if this entry has expired as of `now`.
    ///
    /// The comparison is strict: an entry is still live at the exact
    /// instant of its deadline.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    /// Checks if this entry has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Time left before expiry as of `now`, `None` for entries without a TTL
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires_at| expires_at.saturating_duration_since(now))
    }
}

fn deadline(now: Instant, ttl: Duration) -> Instant {
    now + ttl.min(MAX_TTL)
}
