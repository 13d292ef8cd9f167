//! Per-specification cache of statement plans.
//!
//! Plans are kept in an LRU bounded by `query_cache_size`. A cached plan is
//! reused until it is both older than `min_replan_interval` and built against
//! statistics that drifted past `statistics_divergence_threshold`; it is then
//! discarded and planned again.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use cypher_compiler::{Clock, CompatibilityContext, CompilationMonitor, CompilerResult};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::backend::Planned;
use crate::fingerprint::{PlanFingerprint, ReplanPolicy};

struct CacheEntry<P> {
    planned: Planned<P>,
    fingerprint: PlanFingerprint,
}

/// Thread-safe LRU cache of plans keyed by canonical statement text.
///
/// # Example
///
/// ```ignore
/// let cache = StatementCache::new(&context);
///
/// let planned = cache.get_or_plan(
///     "CYPHER 2.3 planner=cost runtime=interpreted MATCH (n) RETURN n",
///     || backend.graph_cardinality(),
///     || backend.plan(&request),
/// )?;
/// ```
pub struct StatementCache<P> {
    inner: Mutex<LruCache<String, CacheEntry<P>>>,
    capacity: usize,
    policy: ReplanPolicy,
    clock: Arc<dyn Clock>,
    monitor: Arc<dyn CompilationMonitor>,
    hits: AtomicU64,
    misses: AtomicU64,
    discards: AtomicU64,
}

impl<P> StatementCache<P> {
    /// Creates an empty cache sized and timed by `context`.
    ///
    /// A zero `query_cache_size` is treated as one entry.
    pub fn new(context: &CompatibilityContext) -> Self {
        let capacity = NonZeroUsize::new(context.query_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            capacity: capacity.get(),
            policy: ReplanPolicy::from_context(context),
            clock: Arc::clone(&context.clock),
            monitor: Arc::clone(&context.monitor),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            discards: AtomicU64::new(0),
        }
    }

    /// Returns the cached plan for `key`, planning it on a miss or when the
    /// cached plan has gone stale.
    ///
    /// `cardinality` is only consulted for plans old enough to be replanned
    /// and when a new plan is recorded. `plan` runs without the cache lock
    /// held, so concurrent misses on one key may each plan; the last one
    /// stored wins.
    pub fn get_or_plan<C, F>(&self, key: &str, cardinality: C, plan: F) -> CompilerResult<Planned<P>>
    where
        C: Fn() -> f64,
        F: FnOnce() -> CompilerResult<Planned<P>>,
    {
        let cached = self
            .inner
            .lock()
            .get(key)
            .map(|entry| (entry.planned.clone(), entry.fingerprint));

        if let Some((planned, fingerprint)) = cached {
            let now = self.clock.now();
            let stale = fingerprint.is_due(now, &self.policy)
                && fingerprint.is_stale(now, cardinality(), &self.policy);
            if !stale {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.monitor.cache_hit(key);
                return Ok(planned);
            }
            self.discard(key, &fingerprint, now);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.monitor.cache_miss(key);

        let fingerprint = PlanFingerprint::new(self.clock.now(), cardinality());
        let planned = plan()?;
        self.inner.lock().put(
            key.to_string(),
            CacheEntry {
                planned: planned.clone(),
                fingerprint,
            },
        );
        Ok(planned)
    }

    fn discard(&self, key: &str, fingerprint: &PlanFingerprint, now: Instant) {
        {
            let mut inner = self.inner.lock();
            // Another thread may already have replaced the stale entry.
            if inner
                .peek(key)
                .is_some_and(|entry| entry.fingerprint == *fingerprint)
            {
                inner.pop(key);
            }
        }
        let age = fingerprint.age(now);
        self.discards.fetch_add(1, Ordering::Relaxed);
        self.monitor.cache_discard(key, age);
        debug!(key, ?age, "discarded stale plan");
    }

    /// Checks if a plan is cached for `key`, without affecting LRU order.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    /// Number of cached plans.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if no plan is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached plans.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every cached plan. Counters are kept.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> StatementCacheStats {
        StatementCacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            discards: self.discards.load(Ordering::Relaxed),
        }
    }
}

impl<P> std::fmt::Debug for StatementCache<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("StatementCache")
            .field("entries", &stats.entries)
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Statistics about a statement cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementCacheStats {
    /// Plans currently cached.
    pub entries: usize,
    /// Lookups served from cache.
    pub hits: u64,
    /// Lookups that had to plan, including replans.
    pub misses: u64,
    /// Stale plans thrown away.
    pub discards: u64,
}

impl StatementCacheStats {
    /// Fraction of lookups served from cache, or 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
