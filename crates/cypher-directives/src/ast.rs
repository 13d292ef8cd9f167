//! Directive model for pre-parsed Cypher query text.

use std::fmt;
use std::str::FromStr;

use crate::error::DirectiveError;

// =============================================================================
// Language version
// =============================================================================

/// Supported Cypher language versions, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CypherVersion {
    /// Cypher 1.9: no planner or runtime selection.
    V1_9,
    /// Cypher 2.2: planner selection only.
    V2_2,
    /// Cypher 2.3: planner and runtime selection.
    V2_3,
}

impl CypherVersion {
    /// Every supported version, oldest first.
    pub const ALL: [CypherVersion; 3] = [CypherVersion::V1_9, CypherVersion::V2_2, CypherVersion::V2_3];

    /// The version number as written after `CYPHER`.
    pub fn name(&self) -> &'static str {
        match self {
            CypherVersion::V1_9 => "1.9",
            CypherVersion::V2_2 => "2.2",
            CypherVersion::V2_3 => "2.3",
        }
    }
}

impl fmt::Display for CypherVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CypherVersion {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| DirectiveError::invalid_value("version", s, Self::ALL.map(|v| v.name())))
    }
}

// =============================================================================
// Planner
// =============================================================================

/// Query planning strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CypherPlanner {
    /// Rule-based planner.
    Rule,
    /// Cost-based planner.
    Cost,
    /// Iterative dynamic programming planner.
    Idp,
    /// Dynamic programming planner.
    Dp,
}

impl CypherPlanner {
    /// Every planner.
    pub const ALL: [CypherPlanner; 4] = [
        CypherPlanner::Rule,
        CypherPlanner::Cost,
        CypherPlanner::Idp,
        CypherPlanner::Dp,
    ];

    /// Lowercase option value.
    pub fn name(&self) -> &'static str {
        match self {
            CypherPlanner::Rule => "rule",
            CypherPlanner::Cost => "cost",
            CypherPlanner::Idp => "idp",
            CypherPlanner::Dp => "dp",
        }
    }
}

impl fmt::Display for CypherPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CypherPlanner {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DirectiveError::invalid_value("planner", s, Self::ALL.map(|p| p.name())))
    }
}

// =============================================================================
// Runtime
// =============================================================================

/// Execution engines a plan can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CypherRuntime {
    /// Interpreted pipeline.
    Interpreted,
    /// Bytecode-compiled pipeline.
    Compiled,
}

impl CypherRuntime {
    /// Every runtime.
    pub const ALL: [CypherRuntime; 2] = [CypherRuntime::Interpreted, CypherRuntime::Compiled];

    /// Lowercase option value.
    pub fn name(&self) -> &'static str {
        match self {
            CypherRuntime::Interpreted => "interpreted",
            CypherRuntime::Compiled => "compiled",
        }
    }
}

impl fmt::Display for CypherRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CypherRuntime {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DirectiveError::invalid_value("runtime", s, Self::ALL.map(|r| r.name())))
    }
}

// =============================================================================
// Execution mode
// =============================================================================

/// How a compiled query is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionMode {
    /// Plan and execute.
    #[default]
    Normal,
    /// Plan only, return the plan description.
    Explain,
    /// Execute while collecting runtime statistics.
    Profile,
}

impl ExecutionMode {
    /// Keyword for the mode, `None` for [`ExecutionMode::Normal`].
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            ExecutionMode::Normal => None,
            ExecutionMode::Explain => Some("EXPLAIN"),
            ExecutionMode::Profile => Some("PROFILE"),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword().unwrap_or("NORMAL"))
    }
}

// =============================================================================
// Directives
// =============================================================================

/// A single directive found ahead of the query body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Directive {
    /// `CYPHER 2.3`
    Version(CypherVersion),
    /// `EXPLAIN` or `PROFILE`
    Mode(ExecutionMode),
    /// `CYPHER planner=cost`
    Planner(CypherPlanner),
    /// `CYPHER runtime=compiled`
    Runtime(CypherRuntime),
    /// Deprecated keyword form: `PLANNER COST`
    LegacyPlanner(CypherPlanner),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Version(v) => write!(f, "CYPHER {}", v),
            Directive::Mode(m) => write!(f, "{}", m),
            Directive::Planner(p) => write!(f, "planner={}", p),
            Directive::Runtime(r) => write!(f, "runtime={}", r),
            Directive::LegacyPlanner(p) => write!(f, "PLANNER {}", p.name().to_ascii_uppercase()),
        }
    }
}

/// Ordered directives extracted from one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectiveSet {
    directives: Vec<Directive>,
}

impl DirectiveSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a directive, preserving source order.
    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    /// Returns true if no directive was present.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Number of directives.
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Iterates directives in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.directives.iter()
    }

    /// Version directives in source order.
    pub fn versions(&self) -> Vec<CypherVersion> {
        self.collect(|d| match d {
            Directive::Version(v) => Some(*v),
            _ => None,
        })
    }

    /// Mode directives in source order.
    pub fn modes(&self) -> Vec<ExecutionMode> {
        self.collect(|d| match d {
            Directive::Mode(m) => Some(*m),
            _ => None,
        })
    }

    /// Planners requested with `planner=`.
    pub fn planners(&self) -> Vec<CypherPlanner> {
        self.collect(|d| match d {
            Directive::Planner(p) => Some(*p),
            _ => None,
        })
    }

    /// Planners requested with the deprecated `PLANNER` keyword.
    pub fn legacy_planners(&self) -> Vec<CypherPlanner> {
        self.collect(|d| match d {
            Directive::LegacyPlanner(p) => Some(*p),
            _ => None,
        })
    }

    /// Runtimes requested with `runtime=`.
    pub fn runtimes(&self) -> Vec<CypherRuntime> {
        self.collect(|d| match d {
            Directive::Runtime(r) => Some(*r),
            _ => None,
        })
    }

    fn collect<T>(&self, pick: impl Fn(&Directive) -> Option<T>) -> Vec<T> {
        self.directives.iter().filter_map(pick).collect()
    }
}

impl FromIterator<Directive> for DirectiveSet {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        Self {
            directives: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for DirectiveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.directives.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tokenizer output
// =============================================================================

/// Location of the query body within the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputPosition {
    /// Byte offset.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

impl InputPosition {
    /// Computes the position of byte `offset` within `text`.
    ///
    /// Offsets past the end are clamped to `text.len()`, and offsets inside a
    /// multi-byte character move back to the start of that character.
    pub fn at(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let prefix = &text[..offset];
        let line = prefix.matches('\n').count() + 1;
        let column = match prefix.rfind('\n') {
            Some(newline) => prefix[newline + 1..].chars().count() + 1,
            None => prefix.chars().count() + 1,
        };
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for InputPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {} (offset: {})", self.line, self.column, self.offset)
    }
}

/// Directives split from the query body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreParsedStatement {
    /// The query body with directives removed.
    pub statement: String,
    /// Directives in source order.
    pub directives: DirectiveSet,
    /// Where the body starts in the raw text.
    pub position: InputPosition,
}
