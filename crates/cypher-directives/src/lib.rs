//! # cypher-directives
//!
//! Directive model and option tokenizer for versioned Cypher query text.
//!
//! A Cypher query may open with directives that select the language version,
//! the planner, the runtime and the execution mode. This crate splits those
//! directives from the query body and turns them into typed values; deciding
//! what they *mean* for a given version is left to `cypher-compiler`.
//!
//! ## Usage
//!
//! ```rust
//! use cypher_directives::{parse, CypherPlanner, CypherRuntime, CypherVersion};
//!
//! let pre = parse("CYPHER 2.3 planner=cost runtime=interpreted MATCH (n) RETURN n").unwrap();
//!
//! assert_eq!(pre.statement, "MATCH (n) RETURN n");
//! assert_eq!(pre.directives.versions(), vec![CypherVersion::V2_3]);
//! assert_eq!(pre.directives.planners(), vec![CypherPlanner::Cost]);
//! assert_eq!(pre.directives.runtimes(), vec![CypherRuntime::Interpreted]);
//! ```
//!
//! ## Directive Syntax Quick Reference
//!
//! | Directive | Meaning | Example |
//! |-----------|---------|---------|
//! | `CYPHER <version>` | Language version | `CYPHER 2.2` |
//! | `CYPHER planner=<name>` | Planner | `CYPHER planner=idp` |
//! | `CYPHER runtime=<name>` | Runtime | `CYPHER runtime=compiled` |
//! | `PLANNER <name>` | Planner (deprecated form) | `PLANNER COST` |
//! | `EXPLAIN` | Plan only | `EXPLAIN MATCH (n) RETURN n` |
//! | `PROFILE` | Execute with statistics | `PROFILE MATCH (n) RETURN n` |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ast;
mod error;
mod parser;

pub use ast::{
    CypherPlanner, CypherRuntime, CypherVersion, Directive, DirectiveSet, ExecutionMode,
    InputPosition, PreParsedStatement,
};
pub use error::{DirectiveError, DirectiveResult};
pub use parser::{parse, DirectiveParser, OptionTokenizer};
