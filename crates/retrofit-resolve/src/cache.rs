//! Method resolution cache
//!
//! Memoizes [`Resolution`]s per `(type, contract, policy)`. Nothing in the key
//! depends on a particular instance, so one cache can serve the whole process.
//! Storage is bounded; least useful entries are evicted past the capacity.

use crate::matcher::MatchPolicy;
use crate::plan::Resolution;
use moka::sync::Cache;
use once_cell::sync::Lazy;
use retrofit_reflect::{MethodContract, TypeKey};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    type_key: TypeKey,
    contract: MethodContract,
    policy: MatchPolicy,
}

impl CacheKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(type_key: TypeKey, contract: MethodContract, policy: MatchPolicy) -> Self {
        Self {
            type_key,
            contract,
            policy,
        }
    }

    /// Target type identity
    #[inline]
    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Contract being resolved
    #[inline]
    #[must_use]
    pub fn contract(&self) -> &MethodContract {
        &self.contract
    }
}

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,

    /// Lookups answered from the cache
    pub hits: u64,

    /// Lookups that had to resolve
    pub misses: u64,
}

/// Storage for resolutions
///
/// Implementations must tolerate concurrent readers and writers. Racing
/// inserts for one key always carry equal values.
pub trait ResolutionCache: Send + Sync + Debug {
    /// Look up a resolution
    fn get(&self, key: &CacheKey) -> Option<Resolution>;

    /// Store a resolution
    fn insert(&self, key: CacheKey, resolution: Resolution);

    /// Current statistics
    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    /// Drop every entry
    fn clear(&self) {}
}

/// Pass-through cache that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl ResolutionCache for NoCache {
    #[inline]
    fn get(&self, _key: &CacheKey) -> Option<Resolution> {
        None
    }

    #[inline]
    fn insert(&self, _key: CacheKey, _resolution: Resolution) {}
}

/// Capacity used by [`MethodResolutionCache::new`] and the global cache
pub const DEFAULT_CAPACITY: u64 = 10_000;

static GLOBAL: Lazy<Arc<MethodResolutionCache>> =
    Lazy::new(|| Arc::new(MethodResolutionCache::new()));

/// Bounded concurrent resolution cache backed by moka
#[derive(Debug)]
pub struct MethodResolutionCache {
    entries: Cache<CacheKey, Resolution>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MethodResolutionCache {
    /// Create empty cache holding up to [`DEFAULT_CAPACITY`] resolutions
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create empty cache with max capacity
    #[inline]
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            entries: Cache::new(max_capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Process-wide shared cache
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Configured max capacity
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.entries.policy().max_capacity().unwrap_or(DEFAULT_CAPACITY)
    }

    /// Number of stored resolutions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.entry_count()).unwrap_or(usize::MAX)
    }

    /// Check if cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry for one type
    ///
    /// Returns number of entries removed.
    pub fn invalidate_type(&self, type_key: TypeKey) -> usize {
        let stale: Vec<Arc<CacheKey>> = self
            .entries
            .iter()
            .filter(|(key, _)| key.type_key == type_key)
            .map(|(key, _)| key)
            .collect();
        for key in &stale {
            self.entries.invalidate(key.as_ref());
        }
        self.entries.run_pending_tasks();
        stale.len()
    }
}

impl Default for MethodResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionCache for MethodResolutionCache {
    fn get(&self, key: &CacheKey) -> Option<Resolution> {
        let found = self.entries.get(key);
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn insert(&self, key: CacheKey, resolution: Resolution) {
        self.entries.insert(key, resolution);
    }

    fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks();
        CacheStats {
            entry_count: self.entries.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrofit_reflect::{builtins, CapabilityBuilder, TypeRef};

    fn contract() -> (TypeRef, MethodContract) {
        let cap = CapabilityBuilder::new("c.Shape")
            .method("area", &[], &builtins::number())
            .build()
            .unwrap();
        let contract = cap.contracts()[0].clone();
        (cap, contract)
    }

    #[test]
    fn no_cache_never_stores() {
        let (_cap, contract) = contract();
        let key = CacheKey::new(builtins::int().key(), contract, MatchPolicy::default());

        NoCache.insert(key.clone(), Resolution::Unresolvable);
        assert!(NoCache.get(&key).is_none());
        assert_eq!(NoCache.stats(), CacheStats::default());
    }

    #[test]
    fn cache_insert_and_get() {
        let cache = MethodResolutionCache::new();
        let (_cap, contract) = contract();
        let key = CacheKey::new(builtins::int().key(), contract, MatchPolicy::default());

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), Resolution::Unresolvable);
        assert_eq!(cache.get(&key), Some(Resolution::Unresolvable));

        let stats = cache.stats();
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn cache_key_distinguishes_policy() {
        let cache = MethodResolutionCache::new();
        let (_cap, contract) = contract();
        let strict = MatchPolicy {
            unit_return_accepts_any: false,
        };
        let key = CacheKey::new(builtins::int().key(), contract.clone(), MatchPolicy::default());
        let strict_key = CacheKey::new(builtins::int().key(), contract, strict);

        cache.insert(key, Resolution::Unresolvable);
        assert!(cache.get(&strict_key).is_none());
    }

    #[test]
    fn cache_invalidate_type() {
        let cache = MethodResolutionCache::new();
        let (_cap, contract) = contract();
        let policy = MatchPolicy::default();

        cache.insert(
            CacheKey::new(builtins::int().key(), contract.clone(), policy),
            Resolution::Unresolvable,
        );
        cache.insert(
            CacheKey::new(builtins::float().key(), contract, policy),
            Resolution::Unresolvable,
        );

        assert_eq!(cache.invalidate_type(builtins::int().key()), 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_stays_within_capacity() {
        let mut builder = CapabilityBuilder::new("c.Wide");
        for i in 0..64 {
            builder = builder.method(&format!("m{i}"), &[], &builtins::number());
        }
        let cap = builder.build().unwrap();
        let cache = MethodResolutionCache::with_capacity(8);
        assert_eq!(cache.capacity(), 8);

        for contract in cap.contracts() {
            let key = CacheKey::new(builtins::int().key(), contract, MatchPolicy::default());
            cache.insert(key, Resolution::Unresolvable);
        }
        assert!(cache.stats().entry_count <= 8);
    }

    #[test]
    fn global_cache_is_shared() {
        let a = MethodResolutionCache::global();
        let b = MethodResolutionCache::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
