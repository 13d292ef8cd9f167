//! # cypher-compat
//!
//! Reference compatibility objects for `cypher-compiler`.
//!
//! [`CachingCompatibilityFactory`] builds one [`VersionCompatibility`] per
//! planner specification. Each keeps its own LRU of statement plans and
//! replans a statement once the graph statistics it was costed against have
//! drifted far enough.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cypher_compat::{CachingCompatibilityFactory, PlanRequest, Planned, PlanningBackend};
//! use cypher_compiler::{CompilerConfig, CompilerResult, CypherCompiler};
//!
//! struct MyBackend;
//!
//! impl PlanningBackend for MyBackend {
//!     type Plan = MyPlan;
//!
//!     fn plan(&self, request: &PlanRequest<'_>) -> CompilerResult<Planned<MyPlan>> {
//!         Ok(Planned::new(MyPlan::build(request.specification, request.statement)?))
//!     }
//!
//!     fn graph_cardinality(&self) -> f64 {
//!         self.node_count() as f64
//!     }
//! }
//!
//! let compiler = CypherCompiler::new(
//!     CachingCompatibilityFactory::new(MyBackend),
//!     CompilerConfig::default(),
//! )?;
//! let (_, plan) = compiler.pre_parse_and_compile("MATCH (n) RETURN n")?;
//! ```
//!
//! ## Replanning
//!
//! A cached plan is discarded when both hold:
//!
//! - it is at least `min_replan_interval` old
//! - `|now - then| / max(now, then)` of the graph cardinality exceeds
//!   `statistics_divergence_threshold`

#![warn(missing_docs)]

mod backend;
mod compatibility;
mod fingerprint;
mod statement_cache;

pub use backend::{PlanRequest, Planned, PlanningBackend};
pub use compatibility::{CachingCompatibilityFactory, VersionCompatibility};
pub use fingerprint::{PlanFingerprint, ReplanPolicy};
pub use statement_cache::{StatementCache, StatementCacheStats};
