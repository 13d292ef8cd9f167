//! Planner specifications: the key that selects a compatibility object.

use std::fmt;

use cypher_directives::{CypherPlanner, CypherRuntime, CypherVersion};

use crate::query::PreParsedQuery;
use crate::resolution::ILLEGAL_PLANNER_RUNTIME;

/// Which compatibility object serves a query.
///
/// Each version carries only the parameters it can vary on, so two queries
/// that differ in an option their version ignores share a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlannerSpecification {
    /// Cypher 1.9.
    V1_9,
    /// Cypher 2.2 with a planner.
    V2_2 {
        /// Selected planner.
        planner: CypherPlanner,
    },
    /// Cypher 2.3 with a planner and runtime.
    V2_3 {
        /// Selected planner.
        planner: CypherPlanner,
        /// Selected runtime.
        runtime: CypherRuntime,
    },
}

impl PlannerSpecification {
    /// Builds the specification, dropping parameters `version` does not take.
    pub fn new(version: CypherVersion, planner: CypherPlanner, runtime: CypherRuntime) -> Self {
        match version {
            CypherVersion::V1_9 => Self::V1_9,
            CypherVersion::V2_2 => Self::V2_2 { planner },
            CypherVersion::V2_3 => Self::V2_3 { planner, runtime },
        }
    }

    /// The specification for a resolved query.
    pub fn for_query(query: &PreParsedQuery) -> Self {
        Self::new(query.version(), query.planner(), query.runtime())
    }

    /// The language version.
    pub fn version(&self) -> CypherVersion {
        match self {
            Self::V1_9 => CypherVersion::V1_9,
            Self::V2_2 { .. } => CypherVersion::V2_2,
            Self::V2_3 { .. } => CypherVersion::V2_3,
        }
    }

    /// The planner, if this version takes one.
    pub fn planner(&self) -> Option<CypherPlanner> {
        match self {
            Self::V1_9 => None,
            Self::V2_2 { planner } | Self::V2_3 { planner, .. } => Some(*planner),
        }
    }

    /// The runtime, if this version takes one.
    pub fn runtime(&self) -> Option<CypherRuntime> {
        match self {
            Self::V2_3 { runtime, .. } => Some(*runtime),
            _ => None,
        }
    }

    /// Every specification a resolved query can map to.
    pub fn all() -> Vec<Self> {
        let mut specs = vec![Self::V1_9];
        specs.extend(CypherPlanner::ALL.map(|planner| Self::V2_2 { planner }));
        for planner in CypherPlanner::ALL {
            for runtime in CypherRuntime::ALL {
                if !ILLEGAL_PLANNER_RUNTIME.contains(&(planner, runtime)) {
                    specs.push(Self::V2_3 { planner, runtime });
                }
            }
        }
        specs
    }
}

impl fmt::Display for PlannerSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CYPHER {}", self.version())?;
        if let Some(planner) = self.planner() {
            write!(f, " planner={}", planner)?;
        }
        if let Some(runtime) = self.runtime() {
            write!(f, " runtime={}", runtime)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_drops_unused_parameters() {
        assert_eq!(
            PlannerSpecification::new(CypherVersion::V1_9, CypherPlanner::Idp, CypherRuntime::Compiled),
            PlannerSpecification::V1_9
        );
        assert_eq!(
            PlannerSpecification::new(CypherVersion::V2_2, CypherPlanner::Idp, CypherRuntime::Compiled),
            PlannerSpecification::V2_2 {
                planner: CypherPlanner::Idp
            }
        );
        assert_eq!(
            PlannerSpecification::new(CypherVersion::V2_3, CypherPlanner::Idp, CypherRuntime::Compiled),
            PlannerSpecification::V2_3 {
                planner: CypherPlanner::Idp,
                runtime: CypherRuntime::Compiled
            }
        );
    }

    #[test]
    fn test_runtime_is_ignored_for_older_versions() {
        let a = PlannerSpecification::new(CypherVersion::V2_2, CypherPlanner::Cost, CypherRuntime::Compiled);
        let b = PlannerSpecification::new(CypherVersion::V2_2, CypherPlanner::Cost, CypherRuntime::Interpreted);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_accessors() {
        let spec = PlannerSpecification::V2_3 {
            planner: CypherPlanner::Dp,
            runtime: CypherRuntime::Interpreted,
        };
        assert_eq!(spec.version(), CypherVersion::V2_3);
        assert_eq!(spec.planner(), Some(CypherPlanner::Dp));
        assert_eq!(spec.runtime(), Some(CypherRuntime::Interpreted));

        assert_eq!(PlannerSpecification::V1_9.planner(), None);
        assert_eq!(PlannerSpecification::V1_9.runtime(), None);
    }

    #[test]
    fn test_all_enumerates_legal_key_space() {
        let all = PlannerSpecification::all();
        assert_eq!(all.len(), 12);

        let unique: HashSet<_> = all.iter().copied().collect();
        assert_eq!(unique.len(), all.len());

        assert!(!all.contains(&PlannerSpecification::V2_3 {
            planner: CypherPlanner::Rule,
            runtime: CypherRuntime::Compiled
        }));
    }

    #[test]
    fn test_display() {
        assert_eq!(PlannerSpecification::V1_9.to_string(), "CYPHER 1.9");
        assert_eq!(
            PlannerSpecification::V2_2 {
                planner: CypherPlanner::Cost
            }
            .to_string(),
            "CYPHER 2.2 planner=cost"
        );
        assert_eq!(
            PlannerSpecification::V2_3 {
                planner: CypherPlanner::Cost,
                runtime: CypherRuntime::Compiled
            }
            .to_string(),
            "CYPHER 2.3 planner=cost runtime=compiled"
        );
    }
}
