//! Error types for query compilation.

use cypher_directives::DirectiveError;
use thiserror::Error;

/// Errors that can occur while pre-parsing or compiling a query.
///
/// None of these are transient: the same text and configuration always
/// reproduce the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompilerError {
    /// A directive is well formed but not permitted for the resolved version
    /// or combination.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Directives in the same query conflict with each other.
    #[error("Invalid semantics: {0}")]
    InvalidSemantics(String),

    /// The directive prefix could not be tokenized.
    #[error("Syntax error: {0}")]
    Syntax(#[source] DirectiveError),

    /// The compatibility layer failed to produce a plan.
    #[error("Planning failed: {0}")]
    Planning(String),
}

impl CompilerError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates an invalid semantics error.
    pub fn invalid_semantics(message: impl Into<String>) -> Self {
        Self::InvalidSemantics(message.into())
    }

    /// Returns true for [`CompilerError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns true for [`CompilerError::InvalidSemantics`].
    pub fn is_invalid_semantics(&self) -> bool {
        matches!(self, Self::InvalidSemantics(_))
    }
}

impl From<DirectiveError> for CompilerError {
    fn from(err: DirectiveError) -> Self {
        // An unsupported version/planner/runtime value is a bad argument, not bad syntax.
        if err.is_invalid_value() {
            Self::InvalidArgument(err.to_string())
        } else {
            Self::Syntax(err)
        }
    }
}

/// Result type for compiler operations.
pub type CompilerResult<T> = std::result::Result<T, CompilerError>;
