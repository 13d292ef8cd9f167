//! Directive tokenizer implementation using nom.
//!
//! Splits the leading directive prefix from a Cypher query:
//!
//! ```text
//! prefix     := (ws directive)* ws body
//! directive  := EXPLAIN | PROFILE | cypher | legacy
//! cypher     := CYPHER (ws1 VERSION)? (ws1 key ws? '=' ws? value)*
//! legacy     := PLANNER ws1 value
//! ```
//!
//! Keywords are case-insensitive and must end at a word boundary, so a body
//! such as `PROFILES` is never mistaken for a directive.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, digit1, multispace0, multispace1, satisfy},
    combinator::{map, not, opt, peek, recognize},
    multi::many0,
    sequence::{pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::ast::{
    CypherPlanner, CypherRuntime, CypherVersion, Directive, DirectiveSet, ExecutionMode,
    InputPosition, PreParsedStatement,
};
use crate::error::{DirectiveError, DirectiveResult};

/// Splits raw query text into directives and the remaining statement.
///
/// Implementations must be pure: the same text always yields the same result.
pub trait OptionTokenizer: Send + Sync {
    /// Tokenizes the directive prefix of `text`.
    fn tokenize(&self, text: &str) -> DirectiveResult<PreParsedStatement>;
}

/// The default [`OptionTokenizer`], backed by [`parse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveParser;

impl OptionTokenizer for DirectiveParser {
    fn tokenize(&self, text: &str) -> DirectiveResult<PreParsedStatement> {
        parse(text)
    }
}

/// Parse the directive prefix of a query.
///
/// # Examples
///
/// ```rust
/// use cypher_directives::{parse, CypherVersion, ExecutionMode};
///
/// let pre = parse("EXPLAIN CYPHER 2.3 planner=cost MATCH (n) RETURN n").unwrap();
/// assert_eq!(pre.statement, "MATCH (n) RETURN n");
/// assert_eq!(pre.directives.versions(), vec![CypherVersion::V2_3]);
/// assert_eq!(pre.directives.modes(), vec![ExecutionMode::Explain]);
/// ```
pub fn parse(text: &str) -> DirectiveResult<PreParsedStatement> {
    let (body, raw) = match directive_prefix(text) {
        Ok(parsed) => parsed,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(DirectiveError::ParseError {
                position: text.len() - e.input.len(),
                message: format!("unexpected input at: '{}'", truncate(e.input, 20)),
            });
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(DirectiveError::ParseError {
                position: text.len(),
                message: "incomplete directive".to_string(),
            });
        }
    };

    let statement = body.trim_end();
    if statement.is_empty() {
        return Err(DirectiveError::EmptyStatement);
    }

    let mut directives = DirectiveSet::new();
    for directive in raw {
        lower(directive, &mut directives)?;
    }

    Ok(PreParsedStatement {
        statement: statement.to_string(),
        directives,
        position: InputPosition::at(text, text.len() - body.len()),
    })
}

fn truncate(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

// ============================================================================
// Raw directives
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum RawDirective<'a> {
    Mode(ExecutionMode),
    Cypher {
        version: Option<&'a str>,
        options: Vec<(&'a str, &'a str)>,
    },
    LegacyPlanner(&'a str),
}

/// Validates raw option values and appends the typed directives.
fn lower(raw: RawDirective<'_>, out: &mut DirectiveSet) -> DirectiveResult<()> {
    match raw {
        RawDirective::Mode(mode) => out.push(Directive::Mode(mode)),
        RawDirective::LegacyPlanner(name) => {
            out.push(Directive::LegacyPlanner(name.parse::<CypherPlanner>()?));
        }
        RawDirective::Cypher { version, options } => {
            if let Some(version) = version {
                out.push(Directive::Version(version.parse::<CypherVersion>()?));
            }
            for (key, value) in options {
                let directive = if key.eq_ignore_ascii_case("planner") {
                    Directive::Planner(value.parse::<CypherPlanner>()?)
                } else if key.eq_ignore_ascii_case("runtime") {
                    Directive::Runtime(value.parse::<CypherRuntime>()?)
                } else {
                    return Err(DirectiveError::UnknownOption(key.to_string()));
                };
                out.push(directive);
            }
        }
    }
    Ok(())
}

// ============================================================================
// Grammar
// ============================================================================

fn directive_prefix(input: &str) -> IResult<&str, Vec<RawDirective<'_>>> {
    let (input, directives) = many0(preceded(multispace0, directive))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, directives))
}

fn directive(input: &str) -> IResult<&str, RawDirective<'_>> {
    alt((
        map(keyword("EXPLAIN"), |_| RawDirective::Mode(ExecutionMode::Explain)),
        map(keyword("PROFILE"), |_| RawDirective::Mode(ExecutionMode::Profile)),
        cypher_directive,
        legacy_planner,
    ))(input)
}

fn cypher_directive(input: &str) -> IResult<&str, RawDirective<'_>> {
    let (input, _) = keyword("CYPHER")(input)?;
    let (input, version) = opt(preceded(multispace1, version_number))(input)?;
    let (input, options) = many0(preceded(multispace1, option))(input)?;
    Ok((input, RawDirective::Cypher { version, options }))
}

fn legacy_planner(input: &str) -> IResult<&str, RawDirective<'_>> {
    map(
        preceded(tuple((keyword("PLANNER"), multispace1)), identifier),
        RawDirective::LegacyPlanner,
    )(input)
}

/// Any dotted number is taken as a version so that `FromStr` can reject it.
fn version_number(input: &str) -> IResult<&str, &str> {
    terminated(
        recognize(pair(digit1, many0(pair(char('.'), digit1)))),
        not(peek(satisfy(is_word_char))),
    )(input)
}

fn option(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        identifier,
        tuple((multispace0, char('='), multispace0)),
        identifier,
    )(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(is_word_char)(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(word), not(peek(satisfy(is_word_char))))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_directives() {
        let pre = parse("MATCH (n) RETURN n").unwrap();
        assert!(pre.directives.is_empty());
        assert_eq!(pre.statement, "MATCH (n) RETURN n");
        assert_eq!(pre.position.offset, 0);
        assert_eq!(pre.position.column, 1);
    }

    #[test]
    fn test_leading_whitespace_is_skipped() {
        let pre = parse("   RETURN 1").unwrap();
        assert_eq!(pre.statement, "RETURN 1");
        assert_eq!(pre.position.offset, 3);
    }

    #[test]
    fn test_explain_and_profile() {
        let pre = parse("EXPLAIN MATCH (n) RETURN n").unwrap();
        assert_eq!(pre.directives.modes(), vec![ExecutionMode::Explain]);

        let pre = parse("profile MATCH (n) RETURN n").unwrap();
        assert_eq!(pre.directives.modes(), vec![ExecutionMode::Profile]);
    }

    #[test]
    fn test_keyword_requires_word_boundary() {
        let pre = parse("PROFILES_TABLE").unwrap();
        assert!(pre.directives.is_empty());
        assert_eq!(pre.statement, "PROFILES_TABLE");
    }

    #[test]
    fn test_cypher_version_only() {
        let pre = parse("CYPHER 1.9 START n=node(0) RETURN n").unwrap();
        assert_eq!(pre.directives.versions(), vec![CypherVersion::V1_9]);
        assert_eq!(pre.statement, "START n=node(0) RETURN n");
        assert_eq!(pre.position.offset, 11);
    }

    #[test]
    fn test_cypher_options_without_version() {
        let pre = parse("CYPHER planner=idp runtime=compiled RETURN 1").unwrap();
        assert!(pre.directives.versions().is_empty());
        assert_eq!(pre.directives.planners(), vec![CypherPlanner::Idp]);
        assert_eq!(pre.directives.runtimes(), vec![CypherRuntime::Compiled]);
    }

    #[test]
    fn test_option_whitespace_around_equals() {
        let pre = parse("CYPHER 2.3 planner = dp RETURN 1").unwrap();
        assert_eq!(pre.directives.planners(), vec![CypherPlanner::Dp]);
        assert_eq!(pre.statement, "RETURN 1");
    }

    #[test]
    fn test_uppercase_option_keys() {
        let pre =
            parse("EXPLAIN CYPHER 2.3 PLANNER=COST runtime=interpreted MATCH (n) RETURN n")
                .unwrap();
        assert_eq!(pre.directives.modes(), vec![ExecutionMode::Explain]);
        assert_eq!(pre.directives.versions(), vec![CypherVersion::V2_3]);
        assert_eq!(pre.directives.planners(), vec![CypherPlanner::Cost]);
        assert_eq!(pre.directives.runtimes(), vec![CypherRuntime::Interpreted]);
        assert!(pre.directives.legacy_planners().is_empty());
        assert_eq!(pre.statement, "MATCH (n) RETURN n");
    }

    #[test]
    fn test_legacy_planner_keyword() {
        let pre = parse("CYPHER 2.2 PLANNER RULE MATCH (n) RETURN n").unwrap();
        assert_eq!(pre.directives.versions(), vec![CypherVersion::V2_2]);
        assert!(pre.directives.planners().is_empty());
        assert_eq!(pre.directives.legacy_planners(), vec![CypherPlanner::Rule]);
    }

    #[test]
    fn test_directive_order_is_preserved() {
        let pre = parse("PLANNER COST PROFILE CYPHER 2.3 RETURN 1").unwrap();
        let order: Vec<Directive> = pre.directives.iter().copied().collect();
        assert_eq!(
            order,
            vec![
                Directive::LegacyPlanner(CypherPlanner::Cost),
                Directive::Mode(ExecutionMode::Profile),
                Directive::Version(CypherVersion::V2_3),
            ]
        );
    }

    #[test]
    fn test_multiline_prefix_position() {
        let pre = parse("EXPLAIN\nCYPHER 2.3\n  MATCH (n)\nRETURN n\n").unwrap();
        assert_eq!(pre.statement, "MATCH (n)\nRETURN n");
        assert_eq!(pre.position.line, 3);
        assert_eq!(pre.position.column, 3);
    }

    #[test]
    fn test_invalid_version() {
        let err = parse("CYPHER 3.0 RETURN 1").unwrap_err();
        assert!(err.is_invalid_value());
        assert!(err.to_string().contains("3.0 is not a valid version"));
    }

    #[test]
    fn test_malformed_versions_are_rejected() {
        for version in ["3", "2", "2.3.1", "10.0"] {
            let err = parse(&format!("CYPHER {} RETURN 1", version)).unwrap_err();
            assert!(err.is_invalid_value(), "{}: {}", version, err);
            assert!(err
                .to_string()
                .contains(&format!("{} is not a valid version", version)));
        }
    }

    #[test]
    fn test_number_glued_to_word_is_not_a_version() {
        let pre = parse("CYPHER 2x RETURN 1").unwrap();
        assert!(pre.directives.versions().is_empty());
        assert_eq!(pre.statement, "2x RETURN 1");
    }

    #[test]
    fn test_invalid_planner_value() {
        let err = parse("CYPHER planner=greedy RETURN 1").unwrap_err();
        assert!(err.is_invalid_value());

        let err = parse("PLANNER FAST RETURN 1").unwrap_err();
        assert!(err.is_invalid_value());
    }

    #[test]
    fn test_unknown_option_key() {
        let err = parse("CYPHER debug=true RETURN 1").unwrap_err();
        assert_eq!(err, DirectiveError::UnknownOption("debug".to_string()));
    }

    #[test]
    fn test_empty_statement() {
        assert_eq!(parse("").unwrap_err(), DirectiveError::EmptyStatement);
        assert_eq!(parse("EXPLAIN   ").unwrap_err(), DirectiveError::EmptyStatement);
        assert_eq!(parse("CYPHER 2.3").unwrap_err(), DirectiveError::EmptyStatement);
    }

    #[test]
    fn test_tokenizer_trait_delegates_to_parse() {
        let tokenizer = DirectiveParser;
        let pre = tokenizer.tokenize("CYPHER 2.3 RETURN 1").unwrap();
        assert_eq!(pre, parse("CYPHER 2.3 RETURN 1").unwrap());
    }
}
