//! The resolved form of a query, ready for plan production.

use cypher_directives::{
    CypherPlanner, CypherRuntime, CypherVersion, ExecutionMode, InputPosition, PreParsedStatement,
};

use crate::notification::NotificationLogger;

/// The outcome of resolving every directive on a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Resolved language version.
    pub version: CypherVersion,
    /// Resolved execution mode.
    pub execution_mode: ExecutionMode,
    /// Resolved planner.
    pub planner: CypherPlanner,
    /// Resolved runtime.
    pub runtime: CypherRuntime,
}

/// A query whose directives have been resolved and validated.
///
/// Owned by the caller that asked for compilation; one per request.
///
/// # Example
///
/// ```ignore
/// let query = compiler.pre_parse("CYPHER 2.2 PLANNER RULE MATCH (n) RETURN n")?;
///
/// assert_eq!(query.statement(), "MATCH (n) RETURN n");
/// assert_eq!(
///     query.statement_with_version_and_planner(),
///     "CYPHER 2.2 planner=rule runtime=interpreted MATCH (n) RETURN n"
/// );
/// ```
#[derive(Debug)]
pub struct PreParsedQuery {
    raw_statement: String,
    statement: String,
    position: InputPosition,
    options: QueryOptions,
    notification_logger: NotificationLogger,
}

impl PreParsedQuery {
    /// Assembles a resolved query from the tokenizer output.
    pub fn new(
        raw_statement: impl Into<String>,
        pre_parsed: PreParsedStatement,
        options: QueryOptions,
        notification_logger: NotificationLogger,
    ) -> Self {
        Self {
            raw_statement: raw_statement.into(),
            statement: pre_parsed.statement,
            position: pre_parsed.position,
            options,
            notification_logger,
        }
    }

    /// The query body without directives.
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// The text exactly as submitted.
    pub fn raw_statement(&self) -> &str {
        &self.raw_statement
    }

    /// Where the body starts in the raw text.
    pub fn offset(&self) -> InputPosition {
        self.position
    }

    /// All resolved options.
    pub fn options(&self) -> QueryOptions {
        self.options
    }

    /// Resolved language version.
    pub fn version(&self) -> CypherVersion {
        self.options.version
    }

    /// Resolved execution mode.
    pub fn execution_mode(&self) -> ExecutionMode {
        self.options.execution_mode
    }

    /// Resolved planner.
    pub fn planner(&self) -> CypherPlanner {
        self.options.planner
    }

    /// Resolved runtime.
    pub fn runtime(&self) -> CypherRuntime {
        self.options.runtime
    }

    /// Logger collecting notifications for this query.
    pub fn notification_logger(&self) -> &NotificationLogger {
        &self.notification_logger
    }

    /// Canonical restatement used as the key of downstream statement caches.
    ///
    /// Two queries that resolve to the same options and body produce the same
    /// string, however their directives were originally written.
    pub fn statement_with_version_and_planner(&self) -> String {
        format!(
            "CYPHER {} planner={} runtime={} {}",
            self.options.version, self.options.planner, self.options.runtime, self.statement
        )
    }
}
