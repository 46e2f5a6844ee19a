use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Default time-to-live for cached reads.
pub const DEFAULT_TTL: Duration = Duration::from_millis(5000);

/// Default number of keys kept before least-recently-used eviction.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    captured_at: Instant,
}

/// Read-through cache whose entries expire a fixed time after capture,
/// regardless of how often they are read.
///
/// Stale entries are evicted lazily by the lookup that finds them.
pub struct TtlCache<K: Hash + Eq, V> {
    entries: LruCache<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn set(&mut self, key: K, value: V) {
        self.set_at(key, value, Instant::now());
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.pop(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        let stale = match self.entries.get(key) {
            None => return None,
            Some(entry) => now.saturating_duration_since(entry.captured_at) > self.ttl,
        };

        if stale {
            self.entries.pop(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn set_at(&mut self, key: K, value: V, now: Instant) {
        self.entries.put(
            key,
            CacheEntry {
                value,
                captured_at: now,
            },
        );
    }
}

impl<K: Hash + Eq, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
