//! Compiler façade: pre-parse, resolve, dispatch.

use std::sync::Arc;

use cypher_directives::{DirectiveParser, OptionTokenizer};
use tracing::{debug, info};

use crate::cache::PlannerCache;
use crate::config::CompilerConfig;
use crate::error::CompilerResult;
use crate::notification::build_logger;
use crate::query::{PreParsedQuery, QueryOptions};
use crate::resolution::{
    check_execution_mode, compute_execution_mode, compute_planner, compute_runtime,
    compute_version,
};
use crate::specification::PlannerSpecification;
use crate::traits::{Clock, CompatibilityContext, CompatibilityFactory, CompilationMonitor};

/// Entry point for compiling Cypher queries across language versions.
///
/// Safe to share between threads; every method takes `&self`.
///
/// # Example
///
/// ```ignore
/// use cypher_compiler::{CompilerConfig, CypherCompiler};
///
/// let compiler = CypherCompiler::new(MyFactory::default(), CompilerConfig::default())?;
///
/// let query = compiler.pre_parse("EXPLAIN CYPHER 2.3 planner=cost MATCH (n) RETURN n")?;
/// let plan = compiler.compile(&query)?;
///
/// for notification in query.notification_logger().notifications() {
///     println!("{}", notification);
/// }
/// ```
pub struct CypherCompiler<F: CompatibilityFactory> {
    config: CompilerConfig,
    tokenizer: Box<dyn OptionTokenizer>,
    planners: PlannerCache<F>,
}

impl<F: CompatibilityFactory> CypherCompiler<F> {
    /// Creates a compiler with the system clock and no monitoring.
    pub fn new(factory: F, config: CompilerConfig) -> CompilerResult<Self> {
        let context = CompatibilityContext::from_config(&config);
        Self::with_context(factory, config, context)
    }

    /// Creates a compiler whose factory calls receive `context`.
    pub fn with_context(
        factory: F,
        config: CompilerConfig,
        context: CompatibilityContext,
    ) -> CompilerResult<Self> {
        config.validate()?;
        info!(
            default_version = %config.default_version,
            default_planner = %config.default_planner,
            default_runtime = %config.default_runtime,
            query_cache_size = config.query_cache_size,
            "cypher compiler ready"
        );
        Ok(Self {
            config,
            tokenizer: Box::new(DirectiveParser),
            planners: PlannerCache::new(factory, context),
        })
    }

    /// Replaces the directive tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: impl OptionTokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Replaces the clock handed to compatibility objects.
    ///
    /// Objects built before the call keep the clock they were built with.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.planners.context_mut().clock = clock;
        self
    }

    /// Replaces the monitor handed to compatibility objects.
    ///
    /// Objects built before the call keep the monitor they were built with.
    pub fn with_monitor(mut self, monitor: Arc<dyn CompilationMonitor>) -> Self {
        self.planners.context_mut().monitor = monitor;
        self
    }

    /// Splits and resolves the directives of `text`.
    ///
    /// Checks run in order (version, execution mode, planner, runtime) and
    /// the first violation is returned.
    pub fn pre_parse(&self, text: &str) -> CompilerResult<PreParsedQuery> {
        let pre_parsed = self.tokenizer.tokenize(text)?;
        let directives = &pre_parsed.directives;

        let version = compute_version(directives, self.config.default_version)?;
        let execution_mode = compute_execution_mode(directives)?;
        check_execution_mode(execution_mode, version)?;

        let logger = build_logger(execution_mode);
        let planner = compute_planner(directives, version, self.config.default_planner, &logger)?;
        let runtime = compute_runtime(directives, planner, version, self.config.default_runtime)?;

        let options = QueryOptions {
            version,
            execution_mode,
            planner,
            runtime,
        };
        debug!(?options, "pre-parsed query");
        Ok(PreParsedQuery::new(text, pre_parsed, options, logger))
    }

    /// Produces an executable plan through the matching compatibility object.
    pub fn compile(&self, query: &PreParsedQuery) -> CompilerResult<F::Plan> {
        let specification = PlannerSpecification::for_query(query);
        self.planners.resolve(specification).produce_plan(query)
    }

    /// [`pre_parse`](Self::pre_parse) followed by [`compile`](Self::compile).
    pub fn pre_parse_and_compile(&self, text: &str) -> CompilerResult<(PreParsedQuery, F::Plan)> {
        let query = self.pre_parse(text)?;
        let plan = self.compile(&query)?;
        Ok((query, plan))
    }

    /// Builds every compatibility object ahead of the first query.
    pub fn warm_up(&self) {
        self.planners.warm_up();
        info!(entries = self.planners.len(), "planner cache warmed");
    }

    /// Returns a reference to the compiler configuration.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Returns a reference to the planner cache.
    pub fn planner_cache(&self) -> &PlannerCache<F> {
        &self.planners
    }
}

impl<F: CompatibilityFactory> std::fmt::Debug for CypherCompiler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CypherCompiler")
            .field("config", &self.config)
            .field("planners", &self.planners)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompilerError;
    use crate::notification::Notification;
    use crate::traits::{QueryCompatibility, StatementCompatibility};
    use cypher_directives::{
        CypherPlanner, CypherRuntime, CypherVersion, DirectiveResult, ExecutionMode,
        PreParsedStatement,
    };

    /// Plans are the canonical statement, prefixed by what received it.
    struct EchoFactory;

    struct Echo;

    impl StatementCompatibility<String> for Echo {
        fn produce_plan(&self, statement: &str) -> CompilerResult<String> {
            Ok(format!("statement: {}", statement))
        }
    }

    impl QueryCompatibility<String> for Echo {
        fn produce_plan(&self, query: &PreParsedQuery) -> CompilerResult<String> {
            Ok(format!("query: {}", query.statement_with_version_and_planner()))
        }
    }

    impl CompatibilityFactory for EchoFactory {
        type Plan = String;

        fn create_v1_9(&self, _: &CompatibilityContext) -> Arc<dyn StatementCompatibility<String>> {
            Arc::new(Echo)
        }

        fn create_v2_2(
            &self,
            _: CypherPlanner,
            _: &CompatibilityContext,
        ) -> Arc<dyn QueryCompatibility<String>> {
            Arc::new(Echo)
        }

        fn create_v2_3(
            &self,
            _: CypherPlanner,
            _: CypherRuntime,
            _: &CompatibilityContext,
        ) -> Arc<dyn QueryCompatibility<String>> {
            Arc::new(Echo)
        }
    }

    fn compiler() -> CypherCompiler<EchoFactory> {
        CypherCompiler::new(EchoFactory, CompilerConfig::default()).unwrap()
    }

    #[test]
    fn test_pre_parse_defaults() {
        let query = compiler().pre_parse("MATCH (n) RETURN n").unwrap();
        assert_eq!(query.version(), CypherVersion::V2_3);
        assert_eq!(query.planner(), CypherPlanner::Cost);
        assert_eq!(query.runtime(), CypherRuntime::Interpreted);
        assert_eq!(query.execution_mode(), ExecutionMode::Normal);
    }

    #[test]
    fn test_explain_checked_before_planner() {
        // Both the mode and the planner are illegal on 1.9; the mode is reported.
        let err = compiler()
            .pre_parse("EXPLAIN CYPHER 1.9 PLANNER COST RETURN 1")
            .unwrap_err();
        assert_eq!(
            err,
            CompilerError::invalid_argument("EXPLAIN not supported in Cypher 1.9")
        );
    }

    #[test]
    fn test_compile_passes_statement_only_to_1_9() {
        let c = compiler();
        let (_, plan) = c.pre_parse_and_compile("CYPHER 1.9 START n=node(0) RETURN n").unwrap();
        assert_eq!(plan, "statement: START n=node(0) RETURN n");
    }

    #[test]
    fn test_compile_passes_query_to_later_versions() {
        let c = compiler();
        let (_, plan) = c.pre_parse_and_compile("CYPHER 2.2 PLANNER RULE RETURN 1").unwrap();
        assert_eq!(plan, "query: CYPHER 2.2 planner=rule runtime=interpreted RETURN 1");
    }

    #[test]
    fn test_legacy_planner_notification_under_explain() {
        let query = compiler()
            .pre_parse("EXPLAIN CYPHER 2.3 PLANNER IDP RETURN 1")
            .unwrap();
        assert_eq!(
            query.notification_logger().notifications(),
            vec![Notification::LegacyPlannerSyntax {
                planner: CypherPlanner::Idp
            }]
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = CompilerConfig::builder()
            .with_default_planner(CypherPlanner::Rule)
            .with_default_runtime(CypherRuntime::Compiled)
            .build();
        assert!(CypherCompiler::new(EchoFactory, config).is_err());
    }

    #[test]
    fn test_custom_tokenizer() {
        /// Treats the whole text as a 1.9 statement.
        struct Always19;

        impl OptionTokenizer for Always19 {
            fn tokenize(&self, text: &str) -> DirectiveResult<PreParsedStatement> {
                let mut pre = cypher_directives::parse(text)?;
                pre.directives.push(cypher_directives::Directive::Version(CypherVersion::V1_9));
                Ok(pre)
            }
        }

        let c = compiler().with_tokenizer(Always19);
        let query = c.pre_parse("RETURN 1").unwrap();
        assert_eq!(query.version(), CypherVersion::V1_9);
    }

    #[test]
    fn test_with_monitor_sees_builds() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct Builds(AtomicUsize);

        impl CompilationMonitor for Builds {
            fn compatibility_built(&self, _specification: &PlannerSpecification) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let monitor = Arc::new(Builds::default());
        let c = compiler().with_monitor(monitor.clone());
        c.pre_parse_and_compile("RETURN 1").unwrap();
        c.pre_parse_and_compile("RETURN 2").unwrap();
        assert_eq!(monitor.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_warm_up() {
        let c = compiler();
        c.warm_up();
        assert_eq!(c.planner_cache().len(), PlannerSpecification::all().len());
    }
}
