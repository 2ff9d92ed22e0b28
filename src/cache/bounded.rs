//! Bounded secondary caches.
//!
//! Entries are evicted in insertion order once either the entry ceiling or
//! the total-weight ceiling is exceeded. Lookups do not refresh an entry;
//! only re-inserting it does.

use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::trace;

/// Count- and weight-bounded map.
pub struct BoundedCache<K: Hash + Eq, V> {
    entries: LruCache<K, (V, usize)>,
    max_weight: Option<usize>,
    total_weight: usize,
    evictions: u64,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    /// Cache holding at most `max_entries` entries (at least one).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN)),
            max_weight: None,
            total_weight: 0,
            evictions: 0,
        }
    }

    /// Cache that additionally keeps the summed entry weight at or below
    /// `max_weight`.
    pub fn with_weight_limit(max_entries: usize, max_weight: usize) -> Self {
        Self {
            max_weight: Some(max_weight),
            ..Self::new(max_entries)
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.peek(key).map(|(v, _)| v)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains(key)
    }

    /// Insert (or replace) an entry, then evict the oldest entries until both
    /// ceilings hold.
    pub fn insert(&mut self, key: K, value: V, weight: usize) {
        if let Some((_, old)) = self.entries.pop(&key) {
            self.total_weight -= old;
        }
        if let Some((_, (_, evicted))) = self.entries.push(key, (value, weight)) {
            self.total_weight -= evicted;
            self.evictions += 1;
        }
        self.total_weight += weight;

        if let Some(max) = self.max_weight {
            while self.total_weight > max {
                let Some((_, (_, w))) = self.entries.pop_lru() else {
                    break;
                };
                self.total_weight -= w;
                self.evictions += 1;
            }
        }

        trace!(
            entries = self.entries.len(),
            weight = self.total_weight,
            "bounded cache insert"
        );
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (value, weight) = self.entries.pop(key)?;
        self.total_weight -= weight;
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_weight = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> usize {
        self.total_weight
    }

    /// Entries dropped to satisfy a ceiling since creation.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}
