//! Seams between the dispatcher and the version-specific compilers.
//!
//! The dispatcher never plans a query itself. For each
//! [`PlannerSpecification`] it asks a [`CompatibilityFactory`] for a
//! compatibility object once, caches it, and hands queries to it.
//!
//! # Example: Implementing a factory
//!
//! ```ignore
//! use std::sync::Arc;
//! use cypher_compiler::{
//!     CompatibilityContext, CompatibilityFactory, CompilerResult, PreParsedQuery,
//!     QueryCompatibility, StatementCompatibility,
//! };
//! use cypher_directives::{CypherPlanner, CypherRuntime};
//!
//! struct Describe;
//!
//! impl StatementCompatibility<String> for Describe {
//!     fn produce_plan(&self, statement: &str) -> CompilerResult<String> {
//!         Ok(format!("1.9: {}", statement))
//!     }
//! }
//!
//! impl QueryCompatibility<String> for Describe {
//!     fn produce_plan(&self, query: &PreParsedQuery) -> CompilerResult<String> {
//!         Ok(query.statement_with_version_and_planner())
//!     }
//! }
//!
//! struct DescribeFactory;
//!
//! impl CompatibilityFactory for DescribeFactory {
//!     type Plan = String;
//!
//!     fn create_v1_9(&self, _: &CompatibilityContext) -> Arc<dyn StatementCompatibility<String>> {
//!         Arc::new(Describe)
//!     }
//!
//!     fn create_v2_2(&self, _: CypherPlanner, _: &CompatibilityContext) -> Arc<dyn QueryCompatibility<String>> {
//!         Arc::new(Describe)
//!     }
//!
//!     fn create_v2_3(&self, _: CypherPlanner, _: CypherRuntime, _: &CompatibilityContext) -> Arc<dyn QueryCompatibility<String>> {
//!         Arc::new(Describe)
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cypher_directives::{CypherPlanner, CypherRuntime, CypherVersion};

use crate::config::CompilerConfig;
use crate::error::CompilerResult;
use crate::query::PreParsedQuery;
use crate::specification::PlannerSpecification;

// =============================================================================
// Compatibility objects
// =============================================================================

/// A compiler that only understands raw statement text (Cypher 1.9).
pub trait StatementCompatibility<P>: Send + Sync {
    /// Produces an executable plan for `statement`.
    fn produce_plan(&self, statement: &str) -> CompilerResult<P>;
}

/// A compiler that consumes the full resolved query (Cypher 2.2 and later).
pub trait QueryCompatibility<P>: Send + Sync {
    /// Produces an executable plan for `query`.
    fn produce_plan(&self, query: &PreParsedQuery) -> CompilerResult<P>;
}

/// A constructed compatibility object, tagged with the version it serves.
pub enum CompatibilityObject<P> {
    /// Serves [`PlannerSpecification::V1_9`].
    V1_9(Arc<dyn StatementCompatibility<P>>),
    /// Serves [`PlannerSpecification::V2_2`].
    V2_2(Arc<dyn QueryCompatibility<P>>),
    /// Serves [`PlannerSpecification::V2_3`].
    V2_3(Arc<dyn QueryCompatibility<P>>),
}

impl<P> CompatibilityObject<P> {
    /// The version this object compiles.
    pub fn version(&self) -> CypherVersion {
        match self {
            Self::V1_9(_) => CypherVersion::V1_9,
            Self::V2_2(_) => CypherVersion::V2_2,
            Self::V2_3(_) => CypherVersion::V2_3,
        }
    }

    /// Hands `query` to the underlying compiler.
    ///
    /// Cypher 1.9 only ever sees the statement text.
    pub fn produce_plan(&self, query: &PreParsedQuery) -> CompilerResult<P> {
        match self {
            Self::V1_9(compat) => compat.produce_plan(query.statement()),
            Self::V2_2(compat) | Self::V2_3(compat) => compat.produce_plan(query),
        }
    }

    /// Returns true if both refer to the same constructed object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::V1_9(a), Self::V1_9(b)) => same_allocation(a, b),
            (Self::V2_2(a), Self::V2_2(b)) | (Self::V2_3(a), Self::V2_3(b)) => {
                same_allocation(a, b)
            }
            _ => false,
        }
    }
}

fn same_allocation<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

impl<P> Clone for CompatibilityObject<P> {
    fn clone(&self) -> Self {
        match self {
            Self::V1_9(compat) => Self::V1_9(Arc::clone(compat)),
            Self::V2_2(compat) => Self::V2_2(Arc::clone(compat)),
            Self::V2_3(compat) => Self::V2_3(Arc::clone(compat)),
        }
    }
}

impl<P> fmt::Debug for CompatibilityObject<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompatibilityObject")
            .field(&self.version())
            .finish()
    }
}

/// Builds compatibility objects on behalf of the planner cache.
///
/// Called at most once per [`PlannerSpecification`] for the lifetime of a
/// compiler. Construction may be expensive but must not block on I/O.
pub trait CompatibilityFactory: Send + Sync {
    /// What a compatibility object produces.
    type Plan: Send + 'static;

    /// Builds the Cypher 1.9 compiler.
    fn create_v1_9(
        &self,
        context: &CompatibilityContext,
    ) -> Arc<dyn StatementCompatibility<Self::Plan>>;

    /// Builds a Cypher 2.2 compiler for `planner`.
    fn create_v2_2(
        &self,
        planner: CypherPlanner,
        context: &CompatibilityContext,
    ) -> Arc<dyn QueryCompatibility<Self::Plan>>;

    /// Builds a Cypher 2.3 compiler for `planner` and `runtime`.
    fn create_v2_3(
        &self,
        planner: CypherPlanner,
        runtime: CypherRuntime,
        context: &CompatibilityContext,
    ) -> Arc<dyn QueryCompatibility<Self::Plan>>;
}

// =============================================================================
// Shared services
// =============================================================================

/// Time source for plan ageing.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hooks for observing compilation caches. Every method defaults to a no-op.
pub trait CompilationMonitor: Send + Sync {
    /// A compatibility object was constructed.
    fn compatibility_built(&self, _specification: &PlannerSpecification) {}

    /// A statement plan was served from cache.
    fn cache_hit(&self, _key: &str) {}

    /// A statement had no cached plan.
    fn cache_miss(&self, _key: &str) {}

    /// A cached plan was thrown away as stale.
    fn cache_discard(&self, _key: &str, _age: Duration) {}
}

/// A [`CompilationMonitor`] that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl CompilationMonitor for NoopMonitor {}

/// Shared configuration passed to every factory call.
#[derive(Clone)]
pub struct CompatibilityContext {
    /// Capacity of each statement plan cache.
    pub query_cache_size: usize,
    /// Relative statistics change that makes a cached plan stale.
    pub statistics_divergence_threshold: f64,
    /// Minimum plan age before replanning is considered.
    pub min_replan_interval: Duration,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Cache observer.
    pub monitor: Arc<dyn CompilationMonitor>,
}

impl CompatibilityContext {
    /// Context with the system clock and no monitoring.
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            query_cache_size: config.query_cache_size,
            statistics_divergence_threshold: config.statistics_divergence_threshold,
            min_replan_interval: config.min_replan_interval,
            clock: Arc::new(SystemClock),
            monitor: Arc::new(NoopMonitor),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the monitor.
    pub fn with_monitor(mut self, monitor: Arc<dyn CompilationMonitor>) -> Self {
        self.monitor = monitor;
        self
    }
}

impl fmt::Debug for CompatibilityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatibilityContext")
            .field("query_cache_size", &self.query_cache_size)
            .field(
                "statistics_divergence_threshold",
                &self.statistics_divergence_threshold,
            )
            .field("min_replan_interval", &self.min_replan_interval)
            .finish_non_exhaustive()
    }
}
