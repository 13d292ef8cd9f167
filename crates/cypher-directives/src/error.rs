//! Error types for directive tokenizing.

use thiserror::Error;

/// Errors that can occur while splitting directives from query text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// Malformed directive syntax at a specific position in the input.
    #[error("parse error at position {position}: {message}")]
    ParseError {
        /// Byte offset in the input where the error occurred.
        position: usize,
        /// Description of the error.
        message: String,
    },

    /// A recognised option carried a value that is not supported.
    #[error("{value} is not a valid {option}, valid options are {valid}")]
    InvalidValue {
        /// Option name (`version`, `planner`, `runtime`).
        option: &'static str,
        /// The rejected value as written.
        value: String,
        /// Comma separated list of accepted values.
        valid: String,
    },

    /// A `CYPHER key=value` option with an unrecognised key.
    #[error("unknown CYPHER option: {0}")]
    UnknownOption(String),

    /// Nothing left after the directives.
    #[error("empty query statement")]
    EmptyStatement,
}

impl DirectiveError {
    /// Creates an invalid value error listing the accepted values.
    pub fn invalid_value<'a>(
        option: &'static str,
        value: &str,
        valid: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::InvalidValue {
            option,
            value: value.to_string(),
            valid: valid.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    /// Returns true if the directive was well formed but named an unsupported value.
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, Self::InvalidValue { .. })
    }
}

/// Result type for directive operations.
pub type DirectiveResult<T> = std::result::Result<T, DirectiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse_error() {
        let err = DirectiveError::ParseError {
            position: 7,
            message: "expected version".to_string(),
        };
        assert_eq!(err.to_string(), "parse error at position 7: expected version");
    }

    #[test]
    fn test_error_display_invalid_value() {
        let err = DirectiveError::invalid_value("version", "3.0", ["1.9", "2.2", "2.3"]);
        assert_eq!(
            err.to_string(),
            "3.0 is not a valid version, valid options are 1.9, 2.2, 2.3"
        );
        assert!(err.is_invalid_value());
    }

    #[test]
    fn test_error_display_unknown_option() {
        let err = DirectiveError::UnknownOption("debug".to_string());
        assert_eq!(err.to_string(), "unknown CYPHER option: debug");
        assert!(!err.is_invalid_value());
    }
}
