//! The seam between compatibility objects and an actual planner.

use std::fmt;
use std::sync::Arc;

use cypher_compiler::{CompilerResult, Notification, PlannerSpecification};

/// A statement to plan under a fixed specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanRequest<'a> {
    /// Version, planner and runtime the plan must be built for.
    pub specification: PlannerSpecification,
    /// The query body, without directives.
    pub statement: &'a str,
}

/// A plan together with the notifications raised while building it.
///
/// Notifications are replayed to every query served by the same cached plan.
pub struct Planned<P> {
    /// The executable plan.
    pub plan: Arc<P>,
    /// Warnings to surface alongside the plan.
    pub notifications: Vec<Notification>,
}

impl<P> Planned<P> {
    /// A plan with no notifications.
    pub fn new(plan: P) -> Self {
        Self {
            plan: Arc::new(plan),
            notifications: Vec::new(),
        }
    }

    /// Attaches a notification.
    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }
}

impl<P> Clone for Planned<P> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
            notifications: self.notifications.clone(),
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for Planned<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planned")
            .field("plan", &self.plan)
            .field("notifications", &self.notifications)
            .finish()
    }
}

/// Builds plans and reports the statistics they depend on.
///
/// Implementations are shared by every compatibility object of a compiler
/// and are called concurrently.
///
/// # Example
///
/// ```ignore
/// struct Describe;
///
/// impl PlanningBackend for Describe {
///     type Plan = String;
///
///     fn plan(&self, request: &PlanRequest<'_>) -> CompilerResult<Planned<String>> {
///         Ok(Planned::new(format!("{} {}", request.specification, request.statement)))
///     }
///
///     fn graph_cardinality(&self) -> f64 {
///         0.0
///     }
/// }
/// ```
pub trait PlanningBackend: Send + Sync + 'static {
    /// The executable plan type.
    type Plan: Send + Sync + 'static;

    /// Plans `request.statement` under `request.specification`.
    fn plan(&self, request: &PlanRequest<'_>) -> CompilerResult<Planned<Self::Plan>>;

    /// A snapshot of the graph statistics plans are costed against.
    ///
    /// A cached plan is replanned once this drifts far enough from the value
    /// observed when it was built.
    fn graph_cardinality(&self) -> f64;
}

impl<B: PlanningBackend> PlanningBackend for Arc<B> {
    type Plan = B::Plan;

    fn plan(&self, request: &PlanRequest<'_>) -> CompilerResult<Planned<Self::Plan>> {
        (**self).plan(request)
    }

    fn graph_cardinality(&self) -> f64 {
        (**self).graph_cardinality()
    }
}
