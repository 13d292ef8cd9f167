//! Integration tests for directive syntax.
//!
//! These tests exercise the public tokenizer against realistic query prefixes.

use cypher_directives::{
    parse, CypherPlanner, CypherRuntime, CypherVersion, Directive, DirectiveError,
    DirectiveParser, ExecutionMode, OptionTokenizer,
};

#[test]
fn test_every_version_is_recognised() {
    for version in CypherVersion::ALL {
        let text = format!("CYPHER {} RETURN 1", version);
        let pre = parse(&text).unwrap();
        assert_eq!(pre.directives.versions(), vec![version]);
    }
}

#[test]
fn test_every_planner_in_both_forms() {
    for planner in CypherPlanner::ALL {
        let modern = parse(&format!("CYPHER planner={} RETURN 1", planner)).unwrap();
        assert_eq!(modern.directives.planners(), vec![planner]);

        let legacy = parse(&format!(
            "PLANNER {} RETURN 1",
            planner.name().to_uppercase()
        ))
        .unwrap();
        assert_eq!(legacy.directives.legacy_planners(), vec![planner]);
    }
}

#[test]
fn test_every_runtime() {
    for runtime in CypherRuntime::ALL {
        let pre = parse(&format!("CYPHER 2.3 runtime={} RETURN 1", runtime)).unwrap();
        assert_eq!(pre.directives.runtimes(), vec![runtime]);
    }
}

#[test]
fn test_repeated_directives_are_all_reported() {
    // Validation of duplicates belongs to the resolver, the tokenizer keeps everything.
    let pre = parse("CYPHER planner=cost CYPHER planner=rule EXPLAIN PROFILE RETURN 1").unwrap();
    assert_eq!(
        pre.directives.planners(),
        vec![CypherPlanner::Cost, CypherPlanner::Rule]
    );
    assert_eq!(
        pre.directives.modes(),
        vec![ExecutionMode::Explain, ExecutionMode::Profile]
    );
}

#[test]
fn test_body_offset_points_into_raw_text() {
    let text = "PROFILE CYPHER 2.2 PLANNER COST MATCH (a)-->(b) RETURN b";
    let pre = parse(text).unwrap();
    assert_eq!(&text[pre.position.offset..], pre.statement);
    assert_eq!(pre.position.line, 1);
    assert_eq!(pre.position.column, pre.position.offset + 1);
}

#[test]
fn test_body_is_not_consumed_by_option_lookalikes() {
    let pre = parse("CYPHER 2.3 MATCH (n) WHERE n.planner = 'cost' RETURN n").unwrap();
    assert!(pre.directives.planners().is_empty());
    assert_eq!(pre.statement, "MATCH (n) WHERE n.planner = 'cost' RETURN n");
}

#[test]
fn test_directive_display_matches_syntax() {
    let pre = parse("EXPLAIN CYPHER 2.3 planner=cost PLANNER RULE RETURN 1").unwrap();
    let rendered: Vec<String> = pre.directives.iter().map(Directive::to_string).collect();
    assert_eq!(
        rendered,
        vec!["EXPLAIN", "CYPHER 2.3", "planner=cost", "PLANNER RULE"]
    );
}

#[test]
fn test_errors_surface_through_trait() {
    let tokenizer: &dyn OptionTokenizer = &DirectiveParser;
    assert_eq!(
        tokenizer.tokenize("CYPHER cache=off RETURN 1").unwrap_err(),
        DirectiveError::UnknownOption("cache".to_string())
    );
    assert!(tokenizer
        .tokenize("CYPHER runtime=vectorized RETURN 1")
        .unwrap_err()
        .is_invalid_value());
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_round_trip() {
    let pre = parse("EXPLAIN CYPHER 2.3 planner=idp RETURN 1").unwrap();
    let json = serde_json::to_string(&pre).unwrap();
    let back: cypher_directives::PreParsedStatement = serde_json::from_str(&json).unwrap();
    assert_eq!(back, pre);
}
