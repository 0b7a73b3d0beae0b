//! Bounded recency (LRU) cache
//!
//! Fixed-capacity key → value store. Both `get` hits and `put` mark the key
//! most-recently-used; inserting a new key at capacity evicts the
//! least-recently-used entry.
//!
//! All state sits behind one mutex per instance. Each entry carries a
//! monotonically increasing access stamp, and an ordered index from stamp to
//! key gives the eviction victim directly.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

/// Default capacity for both resolver caches
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

pub struct RecencyCache<K, V> {
    capacity: usize,
    inner: Mutex<CacheState<K, V>>,
}

struct CacheState<K, V> {
    entries: HashMap<K, (V, u64)>,
    recency: BTreeMap<u64, K>,
    clock: u64,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn next_stamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl<K, V> RecencyCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheState {
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                clock: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up `key`, refreshing its recency on a hit
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.lock();
        let stamp = state.next_stamp();
        let state = &mut *state;

        let (value, old_stamp) = state.entries.get_mut(key)?;
        let previous = std::mem::replace(old_stamp, stamp);
        let value = value.clone();

        state.recency.remove(&previous);
        state.recency.insert(stamp, key.clone());
        Some(value)
    }

    /// Insert or overwrite `key`, marking it most-recently-used
    pub fn put(&self, key: K, value: V) {
        let mut state = self.lock();
        let stamp = state.next_stamp();
        let state = &mut *state;

        if let Some((_, previous)) = state.entries.insert(key.clone(), (value, stamp)) {
            state.recency.remove(&previous);
        }
        state.recency.insert(stamp, key);

        while state.entries.len() > self.capacity {
            let Some((_, evicted)) = state.recency.pop_first() else {
                break;
            };
            state.entries.remove(&evicted);
            trace!(capacity = self.capacity, "Evicted least-recently-used cache entry");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the maps half-updated in a
    // way that breaks later calls, so a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K, V> Default for RecencyCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
