//! Directive resolution against the version compatibility matrix.
//!
//! Every function here is pure: it only looks at the directives it is given
//! and the defaults passed in, and reports violations instead of correcting
//! them.

use cypher_directives::{
    CypherPlanner, CypherRuntime, CypherVersion, Directive, DirectiveSet, ExecutionMode,
};
use tracing::warn;

use crate::error::{CompilerError, CompilerResult};
use crate::notification::{Notification, NotificationLogger};

/// Versions whose planner cannot be chosen by the query.
pub const FIXED_PLANNER_VERSIONS: &[CypherVersion] = &[CypherVersion::V1_9];

/// Versions whose runtime cannot be chosen by the query.
pub const FIXED_RUNTIME_VERSIONS: &[CypherVersion] = &[CypherVersion::V1_9, CypherVersion::V2_2];

/// Planner/runtime pairs that no version supports.
pub const ILLEGAL_PLANNER_RUNTIME: &[(CypherPlanner, CypherRuntime)] =
    &[(CypherPlanner::Rule, CypherRuntime::Compiled)];

/// Resolves the language version; a version directive overrides `default`.
pub fn compute_version(
    directives: &DirectiveSet,
    default: CypherVersion,
) -> CompilerResult<CypherVersion> {
    match distinct(directives.versions()).as_slice() {
        [] => Ok(default),
        [version] => Ok(*version),
        many => Err(CompilerError::invalid_semantics(format!(
            "Can't use multiple versions: {}",
            join(many)
        ))),
    }
}

/// Merges two execution modes.
///
/// Repeating a mode is harmless and `Normal` is the identity, but `EXPLAIN`
/// and `PROFILE` cannot be combined in one query.
pub fn combine_execution_modes(
    left: ExecutionMode,
    right: ExecutionMode,
) -> CompilerResult<ExecutionMode> {
    match (left, right) {
        (a, b) if a == b => Ok(a),
        (ExecutionMode::Normal, other) | (other, ExecutionMode::Normal) => Ok(other),
        _ => Err(CompilerError::invalid_semantics(
            "Can't mix PROFILE and EXPLAIN",
        )),
    }
}

/// Folds every mode directive; no directive means [`ExecutionMode::Normal`].
pub fn compute_execution_mode(directives: &DirectiveSet) -> CompilerResult<ExecutionMode> {
    directives
        .modes()
        .into_iter()
        .try_fold(ExecutionMode::Normal, combine_execution_modes)
}

/// Rejects `EXPLAIN` on versions that have no planner to describe.
pub fn check_execution_mode(mode: ExecutionMode, version: CypherVersion) -> CompilerResult<()> {
    if mode == ExecutionMode::Explain && FIXED_PLANNER_VERSIONS.contains(&version) {
        return Err(CompilerError::invalid_argument(format!(
            "EXPLAIN not supported in Cypher {}",
            version
        )));
    }
    Ok(())
}

/// Resolves the planner.
///
/// Tries `planner=` options first, then the deprecated `PLANNER <name>`
/// form, then `default`. Each form is validated on its own; using the
/// deprecated form logs [`Notification::LegacyPlannerSyntax`].
pub fn compute_planner(
    directives: &DirectiveSet,
    version: CypherVersion,
    default: CypherPlanner,
    logger: &NotificationLogger,
) -> CompilerResult<CypherPlanner> {
    if let Some(planner) = single_planner(directives.planners(), version, Directive::Planner)? {
        return Ok(planner);
    }

    let legacy = single_planner(directives.legacy_planners(), version, Directive::LegacyPlanner)?;
    if let Some(planner) = legacy {
        warn!(%planner, "deprecated PLANNER syntax used");
        logger.log(Notification::LegacyPlannerSyntax { planner });
        return Ok(planner);
    }

    Ok(default)
}

/// At most one distinct planner, allowed only where the version lets the
/// query choose. `spelling` renders the directive for error messages.
fn single_planner(
    requested: Vec<CypherPlanner>,
    version: CypherVersion,
    spelling: fn(CypherPlanner) -> Directive,
) -> CompilerResult<Option<CypherPlanner>> {
    let planners = distinct(requested);
    if planners.len() > 1 {
        return Err(CompilerError::invalid_semantics(format!(
            "Can't use multiple planners: {}",
            join(&planners)
        )));
    }
    match planners.first() {
        Some(&planner) if FIXED_PLANNER_VERSIONS.contains(&version) => {
            Err(CompilerError::invalid_argument(format!(
                "PLANNER not supported in Cypher {}: {}",
                version,
                spelling(planner)
            )))
        }
        first => Ok(first.copied()),
    }
}

/// Resolves the runtime and checks it against the resolved planner.
pub fn compute_runtime(
    directives: &DirectiveSet,
    planner: CypherPlanner,
    version: CypherVersion,
    default: CypherRuntime,
) -> CompilerResult<CypherRuntime> {
    let runtimes = distinct(directives.runtimes());
    if runtimes.len() > 1 {
        return Err(CompilerError::invalid_semantics(format!(
            "Can't use multiple runtimes: {}",
            join(&runtimes)
        )));
    }
    if let Some(&runtime) = runtimes.first() {
        if FIXED_RUNTIME_VERSIONS.contains(&version) {
            return Err(CompilerError::invalid_argument(format!(
                "RUNTIME not supported in Cypher {}: {}",
                version,
                Directive::Runtime(runtime)
            )));
        }
    }

    let runtime = runtimes.first().copied().unwrap_or(default);
    if ILLEGAL_PLANNER_RUNTIME.contains(&(planner, runtime)) {
        return Err(CompilerError::invalid_argument(format!(
            "Unsupported PLANNER - RUNTIME combination: {} - {}",
            planner, runtime
        )));
    }
    Ok(runtime)
}

fn distinct<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
