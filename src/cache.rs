use std::time::{Duration, Instant};

/// Single-slot TTL cache with stale read-back.
///
/// Holds the most recently stored value and the instant it was stored.
/// `get` only returns the value while it is within the TTL; `get_stale`
/// returns the last stored value regardless of age, so callers can fall
/// back to it when a refresh fails. Once populated the slot is never
/// emptied, only overwritten.
pub struct TtlCache<T: Clone> {
    value: Option<T>,
    cached_at: Option<Instant>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            value: None,
            cached_at: None,
            ttl,
        }
    }

    /// Returns the cached value only when still within TTL.
    pub fn get(&self) -> Option<T> {
        if self.is_fresh() {
            self.value.clone()
        } else {
            None
        }
    }

    /// Returns the last stored value even when past the TTL.
    pub fn get_stale(&self) -> Option<T> {
        self.value.clone()
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
        self.cached_at = Some(Instant::now());
    }

    pub fn is_fresh(&self) -> bool {
        match (self.value.as_ref(), self.cached_at) {
            (Some(_), Some(cached_at)) => cached_at.elapsed() < self.ttl,
            _ => false,
        }
    }

    /// Age of the stored value, if any.
    pub fn age(&self) -> Option<Duration> {
        self.cached_at.map(|cached_at| cached_at.elapsed())
    }
}
