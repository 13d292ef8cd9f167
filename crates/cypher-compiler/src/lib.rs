//! # cypher-compiler
//!
//! Version-aware front-end dispatcher for Cypher query compilation.
//!
//! Queries may open with directives choosing the language version, planner,
//! runtime and execution mode. This crate resolves those directives against
//! what each version supports, then routes the query to a compatibility object
//! built once per (version, planner, runtime) combination.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cypher_compiler::{CompilerConfig, CypherCompiler};
//!
//! // MyFactory implements CompatibilityFactory
//! let compiler = CypherCompiler::new(MyFactory::default(), CompilerConfig::default())?;
//!
//! let query = compiler.pre_parse("CYPHER 2.3 planner=cost runtime=interpreted MATCH (n) RETURN n")?;
//! let plan = compiler.compile(&query)?;
//! ```
//!
//! ## Compatibility Matrix
//!
//! | Version | `planner=` | `runtime=` | `EXPLAIN` | `PROFILE` |
//! |---------|------------|------------|-----------|-----------|
//! | 1.9 | No | No | No | Yes |
//! | 2.2 | Yes | No | Yes | Yes |
//! | 2.3 | Yes | Yes | Yes | Yes |
//!
//! `planner=rule` with `runtime=compiled` is rejected on every version.
//! The deprecated `PLANNER <name>` form behaves like `planner=<name>` and
//! records a notification when the query runs under `EXPLAIN`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      cypher-compiler                         │
//! │                                                              │
//! │  CypherCompiler                                              │
//! │  ├── tokenize directives (OptionTokenizer)                   │
//! │  ├── resolve version → mode → planner → runtime              │
//! │  ├── PlannerSpecification → PlannerCache (build once)        │
//! │  └── compatibility object produces the plan                  │
//! │                                                              │
//! │  Dependencies:                                               │
//! │  └── cypher-directives - directive model + tokenizer         │
//! │                                                              │
//! │  Implemented downstream (e.g. cypher-compat):                │
//! │  └── CompatibilityFactory - builds per-version compilers     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod compiler;
mod config;
mod error;
mod notification;
mod query;
mod resolution;
mod specification;
mod traits;

// Public re-exports
pub use cache::{PlannerCache, PlannerCacheStats};
pub use compiler::CypherCompiler;
pub use config::{CompilerConfig, CompilerConfigBuilder};
pub use error::{CompilerError, CompilerResult};
pub use notification::{build_logger, Notification, NotificationLogger};
pub use query::{PreParsedQuery, QueryOptions};
pub use resolution::{
    check_execution_mode, combine_execution_modes, compute_execution_mode, compute_planner,
    compute_runtime, compute_version, FIXED_PLANNER_VERSIONS, FIXED_RUNTIME_VERSIONS,
    ILLEGAL_PLANNER_RUNTIME,
};
pub use specification::PlannerSpecification;
pub use traits::{
    Clock, CompatibilityContext, CompatibilityFactory, CompatibilityObject, CompilationMonitor,
    NoopMonitor, QueryCompatibility, StatementCompatibility, SystemClock,
};

// Re-export commonly used types from dependencies for convenience
pub use cypher_directives::{
    CypherPlanner, CypherRuntime, CypherVersion, DirectiveSet, ExecutionMode, OptionTokenizer,
};
