// tests/parser_tests.rs

use gbnf::syntax::parser::parse;
use gbnf::RuleElement::*;
use gbnf::{GbnfError, ParseState, RuleElement, SourceContext};

fn parse_text(text: &str) -> Result<ParseState, GbnfError> {
    parse(text, SourceContext::from_text("test", text))
}

fn body(state: &ParseState, id: usize) -> Vec<RuleElement> {
    state.rule_views()[id].to_vec()
}

// ---
// Symbol table and basic lowering
// ---

#[test]
fn test_literal_rule_lowers_to_char_sequence() {
    let state = parse_text(r#"root ::= "ab""#).unwrap();
    assert_eq!(state.symbol_ids.get("root"), Some(&0));
    assert_eq!(body(&state, 0), vec![Char('a'), Char('b'), End]);
}

#[test]
fn test_alternates_are_flattened_with_alt_markers() {
    let state = parse_text(r#"root ::= "a" | "b""#).unwrap();
    assert_eq!(body(&state, 0), vec![Char('a'), Alt, Char('b'), End]);
}

#[test]
fn test_reference_uses_symbol_id() {
    let state = parse_text("root ::= term\nterm ::= \"x\"").unwrap();
    assert_eq!(state.symbol_ids.get("term"), Some(&1));
    assert_eq!(body(&state, 0), vec![RuleRef(1), End]);
    assert_eq!(body(&state, 1), vec![Char('x'), End]);
}

#[test]
fn test_forward_reference_allocates_id_eagerly() {
    // "later" is referenced before it is defined; its id reflects first use.
    let state = parse_text("root ::= later\nlater ::= \"y\"").unwrap();
    assert_eq!(state.symbol_ids.get("later"), Some(&1));
}

#[test]
fn test_rules_can_share_a_line() {
    // A name followed by ::= starts a new definition, newline or not.
    let state = parse_text(r#"root ::= term term ::= "x""#).unwrap();
    assert_eq!(state.rule_count(), 2);
    assert_eq!(body(&state, 0), vec![RuleRef(1), End]);
}

// ---
// Repetition and group lowering
// ---

#[test]
fn test_star_synthesizes_recursive_helper_rule() {
    let state = parse_text(r#"root ::= "a"*"#).unwrap();
    assert_eq!(body(&state, 0), vec![RuleRef(1), End]);
    assert_eq!(body(&state, 1), vec![Char('a'), RuleRef(1), Alt, End]);
    assert_eq!(state.name_of(1), "root_1");
}

#[test]
fn test_plus_requires_at_least_one_occurrence() {
    let state = parse_text(r#"root ::= "a"+"#).unwrap();
    assert_eq!(
        body(&state, 1),
        vec![Char('a'), RuleRef(1), Alt, Char('a'), End]
    );
}

#[test]
fn test_optional_lowers_to_empty_alternate() {
    let state = parse_text(r#"root ::= "a"?"#).unwrap();
    assert_eq!(body(&state, 1), vec![Char('a'), Alt, End]);
}

#[test]
fn test_repetition_wraps_the_whole_literal() {
    let state = parse_text(r#"root ::= "ab"*"#).unwrap();
    assert_eq!(
        body(&state, 1),
        vec![Char('a'), Char('b'), RuleRef(1), Alt, End]
    );
}

#[test]
fn test_group_becomes_anonymous_rule() {
    let state = parse_text(r#"root ::= ("a" | "b") "c""#).unwrap();
    assert_eq!(body(&state, 0), vec![RuleRef(1), Char('c'), End]);
    assert_eq!(body(&state, 1), vec![Char('a'), Alt, Char('b'), End]);
}

// ---
// Character classes and escapes
// ---

#[test]
fn test_char_class_with_range_and_singleton() {
    let state = parse_text("root ::= [a-z0]").unwrap();
    assert_eq!(
        body(&state, 0),
        vec![Char('a'), CharRangeUpper('z'), CharAlt('0'), End]
    );
}

#[test]
fn test_negated_char_class() {
    let state = parse_text("root ::= [^ab]").unwrap();
    assert_eq!(body(&state, 0), vec![NotChar('a'), CharAlt('b'), End]);
}

#[test]
fn test_trailing_dash_is_a_class_member() {
    let state = parse_text("root ::= [a-]").unwrap();
    assert_eq!(body(&state, 0), vec![Char('a'), CharAlt('-'), End]);
}

#[test]
fn test_literal_escapes() {
    let state = parse_text(r#"root ::= "\n\x41é""#).unwrap();
    assert_eq!(
        body(&state, 0),
        vec![Char('\n'), Char('A'), Char('\u{e9}'), End]
    );
}

#[test]
fn test_class_escapes() {
    let state = parse_text(r"root ::= [\t\]]").unwrap();
    assert_eq!(body(&state, 0), vec![Char('\t'), CharAlt(']'), End]);
}

// ---
// Errors
// ---

#[test]
fn test_duplicate_definition_is_rejected() {
    let error = parse_text("root ::= \"a\"\nroot ::= \"b\"").unwrap_err();
    assert!(matches!(error, GbnfError::DuplicateRule { ref name, .. } if name == "root"));
}

#[test]
fn test_invalid_escape_is_rejected() {
    let error = parse_text(r#"root ::= "\q""#).unwrap_err();
    assert!(matches!(error, GbnfError::InvalidEscape { ref sequence, .. } if sequence == "\\q"));
}

#[test]
fn test_truncated_hex_escape_is_rejected() {
    let error = parse_text(r#"root ::= "\x4""#).unwrap_err();
    assert!(matches!(error, GbnfError::InvalidEscape { .. }));
}

#[test]
fn test_empty_char_class_is_rejected() {
    let error = parse_text("root ::= []").unwrap_err();
    assert!(matches!(error, GbnfError::EmptyCharClass { .. }));
}

#[test]
fn test_missing_definition_operator_fails() {
    assert!(parse_text("root \"a\"").is_err());
}

#[test]
fn test_unterminated_group_fails() {
    assert!(parse_text(r#"root ::= ("a""#).is_err());
}

#[test]
fn test_empty_grammar_parses_to_empty_state() {
    let state = parse_text("").unwrap();
    assert_eq!(state.rule_count(), 0);
}
