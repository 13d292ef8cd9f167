//! Configuration types for the Cypher compiler.

use std::time::Duration;

use cypher_directives::{CypherPlanner, CypherRuntime, CypherVersion};

use crate::error::{CompilerError, CompilerResult};
use crate::resolution::ILLEGAL_PLANNER_RUNTIME;

/// Configuration for the compiler façade.
///
/// # Example
///
/// ```rust
/// use cypher_compiler::CompilerConfig;
/// use cypher_directives::{CypherPlanner, CypherVersion};
/// use std::time::Duration;
///
/// let config = CompilerConfig::builder()
///     .with_default_version(CypherVersion::V2_2)
///     .with_default_planner(CypherPlanner::Idp)
///     .with_query_cache_size(500)
///     .with_min_replan_interval(Duration::from_secs(5))
///     .build();
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerConfig {
    /// Version used when the query carries no `CYPHER <version>` directive.
    pub default_version: CypherVersion,
    /// Planner used when the query requests none.
    pub default_planner: CypherPlanner,
    /// Runtime used when the query requests none.
    pub default_runtime: CypherRuntime,
    /// Capacity of each per-version statement plan cache.
    pub query_cache_size: usize,
    /// Relative statistics change that makes a cached plan stale.
    pub statistics_divergence_threshold: f64,
    /// Minimum age of a cached plan before it can be replanned.
    pub min_replan_interval: Duration,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_version: CypherVersion::V2_3,
            default_planner: CypherPlanner::Cost,
            default_runtime: CypherRuntime::Interpreted,
            query_cache_size: 1_000,
            statistics_divergence_threshold: 0.5,
            min_replan_interval: Duration::from_secs(1),
        }
    }
}

impl CompilerConfig {
    /// Creates a new builder for CompilerConfig.
    pub fn builder() -> CompilerConfigBuilder {
        CompilerConfigBuilder::default()
    }

    /// Rejects configurations under which no query could ever compile.
    pub fn validate(&self) -> CompilerResult<()> {
        if ILLEGAL_PLANNER_RUNTIME.contains(&(self.default_planner, self.default_runtime)) {
            return Err(CompilerError::invalid_argument(format!(
                "default planner {} cannot be combined with default runtime {}",
                self.default_planner, self.default_runtime
            )));
        }
        if !(0.0..=1.0).contains(&self.statistics_divergence_threshold) {
            return Err(CompilerError::invalid_argument(format!(
                "statistics divergence threshold must be within [0, 1], got {}",
                self.statistics_divergence_threshold
            )));
        }
        Ok(())
    }
}

/// Builder for CompilerConfig.
#[derive(Debug, Clone, Default)]
pub struct CompilerConfigBuilder {
    config: CompilerConfig,
}

impl CompilerConfigBuilder {
    /// Sets the default language version.
    pub fn with_default_version(mut self, version: CypherVersion) -> Self {
        self.config.default_version = version;
        self
    }

    /// Sets the default planner.
    pub fn with_default_planner(mut self, planner: CypherPlanner) -> Self {
        self.config.default_planner = planner;
        self
    }

    /// Sets the default runtime.
    pub fn with_default_runtime(mut self, runtime: CypherRuntime) -> Self {
        self.config.default_runtime = runtime;
        self
    }

    /// Sets the statement plan cache capacity.
    pub fn with_query_cache_size(mut self, size: usize) -> Self {
        self.config.query_cache_size = size;
        self
    }

    /// Sets the statistics divergence threshold.
    pub fn with_statistics_divergence_threshold(mut self, threshold: f64) -> Self {
        self.config.statistics_divergence_threshold = threshold;
        self
    }

    /// Sets the minimum replan interval.
    pub fn with_min_replan_interval(mut self, interval: Duration) -> Self {
        self.config.min_replan_interval = interval;
        self
    }

    /// Builds the CompilerConfig.
    pub fn build(self) -> CompilerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_config_default() {
        let config = CompilerConfig::default();
        assert_eq!(config.default_version, CypherVersion::V2_3);
        assert_eq!(config.default_planner, CypherPlanner::Cost);
        assert_eq!(config.default_runtime, CypherRuntime::Interpreted);
        assert_eq!(config.query_cache_size, 1_000);
        assert_eq!(config.min_replan_interval, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_compiler_config_builder() {
        let config = CompilerConfig::builder()
            .with_default_version(CypherVersion::V1_9)
            .with_default_planner(CypherPlanner::Rule)
            .with_default_runtime(CypherRuntime::Interpreted)
            .with_query_cache_size(10)
            .with_statistics_divergence_threshold(0.1)
            .with_min_replan_interval(Duration::from_millis(250))
            .build();

        assert_eq!(config.default_version, CypherVersion::V1_9);
        assert_eq!(config.default_planner, CypherPlanner::Rule);
        assert_eq!(config.query_cache_size, 10);
        assert_eq!(config.statistics_divergence_threshold, 0.1);
        assert_eq!(config.min_replan_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_validate_rejects_illegal_default_pair() {
        let config = CompilerConfig::builder()
            .with_default_planner(CypherPlanner::Rule)
            .with_default_runtime(CypherRuntime::Compiled)
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("rule"));
        assert!(err.to_string().contains("compiled"));
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let config = CompilerConfig::builder()
            .with_statistics_divergence_threshold(1.5)
            .build();
        assert!(config.validate().is_err());
    }
}
