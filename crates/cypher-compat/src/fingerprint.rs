//! Staleness checks for cached plans.

use std::time::{Duration, Instant};

use cypher_compiler::CompatibilityContext;

/// When a cached plan may be thrown away and rebuilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplanPolicy {
    /// Relative statistics change, in `[0, 1]`, that makes a plan stale.
    pub divergence_threshold: f64,
    /// Plans younger than this are always reused.
    pub min_replan_interval: Duration,
}

impl ReplanPolicy {
    /// Reads the policy from the shared compatibility context.
    pub fn from_context(context: &CompatibilityContext) -> Self {
        Self {
            divergence_threshold: context.statistics_divergence_threshold,
            min_replan_interval: context.min_replan_interval,
        }
    }
}

/// The statistics a plan was built against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanFingerprint {
    /// When planning happened.
    pub planned_at: Instant,
    /// Graph cardinality observed at planning time.
    pub cardinality: f64,
}

impl PlanFingerprint {
    /// Creates a fingerprint.
    pub fn new(planned_at: Instant, cardinality: f64) -> Self {
        Self {
            planned_at,
            cardinality,
        }
    }

    /// How old the plan is at `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.planned_at)
    }

    /// Whether the plan is old enough to be checked against fresh statistics.
    pub fn is_due(&self, now: Instant, policy: &ReplanPolicy) -> bool {
        self.age(now) >= policy.min_replan_interval
    }

    /// Relative change between the recorded and `current` cardinality.
    ///
    /// Returns 0 when both are zero.
    pub fn divergence(&self, current: f64) -> f64 {
        let max = self.cardinality.abs().max(current.abs());
        if max == 0.0 {
            return 0.0;
        }
        (current - self.cardinality).abs() / max
    }

    /// A plan is stale once it is due and the statistics moved past the
    /// threshold.
    pub fn is_stale(&self, now: Instant, current: f64, policy: &ReplanPolicy) -> bool {
        self.is_due(now, policy) && self.divergence(current) > policy.divergence_threshold
    }
}
