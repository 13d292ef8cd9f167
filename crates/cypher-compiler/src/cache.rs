//! Lazily built cache of compatibility objects.
//!
//! Maps each [`PlannerSpecification`] to the compatibility object serving it.
//! The key space is small and finite, so entries are never evicted.
//!
//! Hits only take a shared read lock. Misses insert a per-key
//! [`OnceLock`] slot under a short write lock and then build outside of it,
//! so concurrent misses on the same key wait for a single construction while
//! misses on different keys build in parallel.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::specification::PlannerSpecification;
use crate::traits::{CompatibilityContext, CompatibilityFactory, CompatibilityObject};

type Slot<P> = Arc<OnceLock<CompatibilityObject<P>>>;

/// Thread-safe, build-once cache of compatibility objects.
///
/// # Example
///
/// ```ignore
/// let cache = PlannerCache::new(factory, CompatibilityContext::from_config(&config));
///
/// let spec = PlannerSpecification::V2_2 { planner: CypherPlanner::Cost };
/// let first = cache.resolve(spec);
/// let second = cache.resolve(spec);
/// assert!(first.ptr_eq(&second));
/// ```
pub struct PlannerCache<F: CompatibilityFactory> {
    factory: F,
    context: CompatibilityContext,
    slots: RwLock<HashMap<PlannerSpecification, Slot<F::Plan>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<F: CompatibilityFactory> PlannerCache<F> {
    /// Creates an empty cache that builds through `factory`.
    pub fn new(factory: F, context: CompatibilityContext) -> Self {
        Self {
            factory,
            context,
            slots: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the compatibility object for `specification`, building it on
    /// first use.
    ///
    /// At most one factory call is made per specification, however many
    /// threads ask for it at once.
    pub fn resolve(&self, specification: PlannerSpecification) -> CompatibilityObject<F::Plan> {
        let existing = self.slots.read().get(&specification).cloned();
        if let Some(object) = existing.as_ref().and_then(|slot| slot.get()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return object.clone();
        }

        let slot = match existing {
            Some(slot) => slot,
            None => Arc::clone(self.slots.write().entry(specification).or_default()),
        };

        let mut built = false;
        let object = slot.get_or_init(|| {
            built = true;
            self.build(specification)
        });
        if built {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        object.clone()
    }

    /// Returns the cached object without building it.
    pub fn get(&self, specification: &PlannerSpecification) -> Option<CompatibilityObject<F::Plan>> {
        self.slots
            .read()
            .get(specification)
            .and_then(|slot| slot.get().cloned())
    }

    /// Returns true if an object for `specification` has been built.
    pub fn contains(&self, specification: &PlannerSpecification) -> bool {
        self.get(specification).is_some()
    }

    /// Number of constructed objects.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Returns true if nothing has been built yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Specifications with a constructed object, in key order.
    pub fn specifications(&self) -> Vec<PlannerSpecification> {
        let mut specs: Vec<_> = self
            .slots
            .read()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(spec, _)| *spec)
            .collect();
        specs.sort();
        specs
    }

    /// Builds every specification a query can resolve to.
    pub fn warm_up(&self) {
        for specification in PlannerSpecification::all() {
            let _ = self.resolve(specification);
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> PlannerCacheStats {
        PlannerCacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// The context handed to the factory.
    pub fn context(&self) -> &CompatibilityContext {
        &self.context
    }

    pub(crate) fn context_mut(&mut self) -> &mut CompatibilityContext {
        &mut self.context
    }

    /// The factory building compatibility objects.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    fn build(&self, specification: PlannerSpecification) -> CompatibilityObject<F::Plan> {
        debug!(%specification, "building compatibility object");
        let object = match specification {
            PlannerSpecification::V1_9 => {
                CompatibilityObject::V1_9(self.factory.create_v1_9(&self.context))
            }
            PlannerSpecification::V2_2 { planner } => {
                CompatibilityObject::V2_2(self.factory.create_v2_2(planner, &self.context))
            }
            PlannerSpecification::V2_3 { planner, runtime } => CompatibilityObject::V2_3(
                self.factory.create_v2_3(planner, runtime, &self.context),
            ),
        };
        self.context.monitor.compatibility_built(&specification);
        object
    }
}

impl<F: CompatibilityFactory> fmt::Debug for PlannerCache<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("PlannerCache")
            .field("entries", &stats.entries)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}

/// Statistics about the planner cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlannerCacheStats {
    /// Constructed objects.
    pub entries: usize,
    /// Lookups served by an existing object.
    pub hits: u64,
    /// Lookups that ran the factory. Equal to the number of constructions.
    pub misses: u64,
}
