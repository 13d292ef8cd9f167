//! Compatibility objects backed by a [`PlanningBackend`] and a statement cache.

use std::fmt;
use std::sync::Arc;

use cypher_compiler::{
    CompatibilityContext, CompatibilityFactory, CompilerResult, CypherPlanner, CypherRuntime,
    PlannerSpecification, PreParsedQuery, QueryCompatibility, StatementCompatibility,
};
use tracing::debug;

use crate::backend::{PlanRequest, Planned, PlanningBackend};
use crate::statement_cache::StatementCache;

/// Compiles queries for one [`PlannerSpecification`].
///
/// Cypher 1.9 plans are keyed by the statement text. Later versions are keyed
/// by [`PreParsedQuery::statement_with_version_and_planner`], so queries that
/// differ only in how their directives were spelled share a plan.
pub struct VersionCompatibility<B: PlanningBackend> {
    specification: PlannerSpecification,
    backend: Arc<B>,
    cache: StatementCache<B::Plan>,
}

impl<B: PlanningBackend> VersionCompatibility<B> {
    /// Creates a compatibility object with an empty statement cache.
    pub fn new(
        specification: PlannerSpecification,
        backend: Arc<B>,
        context: &CompatibilityContext,
    ) -> Self {
        Self {
            specification,
            backend,
            cache: StatementCache::new(context),
        }
    }

    /// The specification this object plans for.
    pub fn specification(&self) -> PlannerSpecification {
        self.specification
    }

    /// The statement cache.
    pub fn cache(&self) -> &StatementCache<B::Plan> {
        &self.cache
    }

    fn plan_cached(&self, key: &str, statement: &str) -> CompilerResult<Planned<B::Plan>> {
        self.cache.get_or_plan(
            key,
            || self.backend.graph_cardinality(),
            || {
                debug!(specification = %self.specification, statement, "planning statement");
                self.backend.plan(&PlanRequest {
                    specification: self.specification,
                    statement,
                })
            },
        )
    }
}

impl<B: PlanningBackend> StatementCompatibility<Arc<B::Plan>> for VersionCompatibility<B> {
    fn produce_plan(&self, statement: &str) -> CompilerResult<Arc<B::Plan>> {
        // Only the statement reaches 1.9, so there is no logger to replay to.
        Ok(self.plan_cached(statement, statement)?.plan)
    }
}

impl<B: PlanningBackend> QueryCompatibility<Arc<B::Plan>> for VersionCompatibility<B> {
    fn produce_plan(&self, query: &PreParsedQuery) -> CompilerResult<Arc<B::Plan>> {
        let key = query.statement_with_version_and_planner();
        let planned = self.plan_cached(&key, query.statement())?;
        for notification in &planned.notifications {
            query.notification_logger().log(*notification);
        }
        Ok(planned.plan)
    }
}

impl<B: PlanningBackend> fmt::Debug for VersionCompatibility<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionCompatibility")
            .field("specification", &self.specification)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// A [`CompatibilityFactory`] whose objects all plan through one backend.
///
/// # Example
///
/// ```ignore
/// use cypher_compat::CachingCompatibilityFactory;
/// use cypher_compiler::{CompilerConfig, CypherCompiler};
///
/// let factory = CachingCompatibilityFactory::new(MyBackend::connect()?);
/// let compiler = CypherCompiler::new(factory, CompilerConfig::default())?;
///
/// let (_, plan) = compiler.pre_parse_and_compile("MATCH (n) RETURN count(n)")?;
/// ```
pub struct CachingCompatibilityFactory<B: PlanningBackend> {
    backend: Arc<B>,
}

impl<B: PlanningBackend> CachingCompatibilityFactory<B> {
    /// Creates a factory owning `backend`.
    pub fn new(backend: B) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    /// Creates a factory sharing an existing backend.
    pub fn from_shared(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// The backend every object plans through.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    fn create(
        &self,
        specification: PlannerSpecification,
        context: &CompatibilityContext,
    ) -> Arc<VersionCompatibility<B>> {
        Arc::new(VersionCompatibility::new(
            specification,
            Arc::clone(&self.backend),
            context,
        ))
    }
}

impl<B: PlanningBackend> CompatibilityFactory for CachingCompatibilityFactory<B> {
    type Plan = Arc<B::Plan>;

    fn create_v1_9(
        &self,
        context: &CompatibilityContext,
    ) -> Arc<dyn StatementCompatibility<Self::Plan>> {
        self.create(PlannerSpecification::V1_9, context)
    }

    fn create_v2_2(
        &self,
        planner: CypherPlanner,
        context: &CompatibilityContext,
    ) -> Arc<dyn QueryCompatibility<Self::Plan>> {
        self.create(PlannerSpecification::V2_2 { planner }, context)
    }

    fn create_v2_3(
        &self,
        planner: CypherPlanner,
        runtime: CypherRuntime,
        context: &CompatibilityContext,
    ) -> Arc<dyn QueryCompatibility<Self::Plan>> {
        self.create(PlannerSpecification::V2_3 { planner, runtime }, context)
    }
}

impl<B: PlanningBackend> fmt::Debug for CachingCompatibilityFactory<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingCompatibilityFactory").finish_non_exhaustive()
    }
}
