//! Per-query notification loggers.
//!
//! Only `EXPLAIN` queries surface notifications to the caller, so every other
//! mode gets a logger that drops what it is given.

use std::cell::RefCell;
use std::fmt;

use cypher_directives::{CypherPlanner, CypherRuntime, ExecutionMode};

/// A warning raised while compiling a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The deprecated `PLANNER <name>` form was used.
    LegacyPlannerSyntax {
        /// The planner it selected.
        planner: CypherPlanner,
    },
    /// The requested planner could not handle the query and another was used.
    PlannerUnsupported {
        /// The planner that was asked for.
        requested: CypherPlanner,
    },
    /// The requested runtime could not handle the query and another was used.
    RuntimeUnsupported {
        /// The runtime that was asked for.
        requested: CypherRuntime,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::LegacyPlannerSyntax { planner } => write!(
                f,
                "Using PLANNER for switching between planners has been deprecated, \
                 please use CYPHER planner={} instead",
                planner
            ),
            Notification::PlannerUnsupported { requested } => write!(
                f,
                "The {} planner does not support this query, a fallback planner was used",
                requested
            ),
            Notification::RuntimeUnsupported { requested } => write!(
                f,
                "The {} runtime does not support this query, a fallback runtime was used",
                requested
            ),
        }
    }
}

/// Collects or discards notifications for a single query.
///
/// Owned by one query; not shared across threads.
#[derive(Debug)]
pub enum NotificationLogger {
    /// Keeps every notification for later retrieval.
    Recording(RefCell<Vec<Notification>>),
    /// Accepts and drops every notification.
    DevNull,
}

impl NotificationLogger {
    /// Creates a recording logger.
    pub fn recording() -> Self {
        Self::Recording(RefCell::new(Vec::new()))
    }

    /// Records a notification, or drops it for [`NotificationLogger::DevNull`].
    pub fn log(&self, notification: Notification) {
        if let Self::Recording(recorded) = self {
            recorded.borrow_mut().push(notification);
        }
    }

    /// Notifications recorded so far.
    pub fn notifications(&self) -> Vec<Notification> {
        match self {
            Self::Recording(recorded) => recorded.borrow().clone(),
            Self::DevNull => Vec::new(),
        }
    }

    /// Returns true if notifications are being kept.
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording(_))
    }
}

/// Chooses the logger for a query in `mode`.
pub fn build_logger(mode: ExecutionMode) -> NotificationLogger {
    match mode {
        ExecutionMode::Explain => NotificationLogger::recording(),
        ExecutionMode::Normal | ExecutionMode::Profile => NotificationLogger::DevNull,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_gets_recording_logger() {
        let logger = build_logger(ExecutionMode::Explain);
        assert!(logger.is_recording());

        logger.log(Notification::LegacyPlannerSyntax {
            planner: CypherPlanner::Rule,
        });
        assert_eq!(
            logger.notifications(),
            vec![Notification::LegacyPlannerSyntax {
                planner: CypherPlanner::Rule
            }]
        );
    }

    #[test]
    fn test_other_modes_discard() {
        for mode in [ExecutionMode::Normal, ExecutionMode::Profile] {
            let logger = build_logger(mode);
            assert!(!logger.is_recording());
            logger.log(Notification::RuntimeUnsupported {
                requested: CypherRuntime::Compiled,
            });
            assert!(logger.notifications().is_empty());
        }
    }

    #[test]
    fn test_loggers_are_independent() {
        let first = build_logger(ExecutionMode::Explain);
        let second = build_logger(ExecutionMode::Explain);
        first.log(Notification::PlannerUnsupported {
            requested: CypherPlanner::Idp,
        });
        assert_eq!(first.notifications().len(), 1);
        assert!(second.notifications().is_empty());
    }

    #[test]
    fn test_notification_display() {
        let n = Notification::LegacyPlannerSyntax {
            planner: CypherPlanner::Cost,
        };
        assert_eq!(
            n.to_string(),
            "Using PLANNER for switching between planners has been deprecated, \
             please use CYPHER planner=cost instead"
        );
    }
}
