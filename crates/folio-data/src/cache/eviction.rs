//! Eviction policies for [`SourceCache`](super::SourceCache).

use super::CacheKey;
use std::collections::VecDeque;

/// Decides which entry leaves the cache when it grows.
pub trait EvictionPolicy: Send + std::fmt::Debug {
    /// Record that `key` was inserted or read.
    fn touch(&mut self, key: &CacheKey);

    /// Forget `key` after it was removed from the cache.
    fn forget(&mut self, key: &CacheKey);

    /// Pick an entry to evict given the current entry count, if over capacity.
    fn victim(&mut self, len: usize) -> Option<CacheKey>;
}

/// Never evicts.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbounded;

impl EvictionPolicy for Unbounded {
    fn touch(&mut self, _key: &CacheKey) {}

    fn forget(&mut self, _key: &CacheKey) {}

    fn victim(&mut self, _len: usize) -> Option<CacheKey> {
        None
    }
}

/// Bounded least-recently-used eviction.
#[derive(Debug, Clone)]
pub struct Lru {
    capacity: usize,
    // Most recently used at the front.
    order: VecDeque<CacheKey>,
}

impl Lru {
    /// Create a policy holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl EvictionPolicy for Lru {
    fn touch(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.clone());
    }

    fn forget(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
    }

    fn victim(&mut self, len: usize) -> Option<CacheKey> {
        if len > self.capacity {
            self.order.pop_back()
        } else {
            None
        }
    }
}
