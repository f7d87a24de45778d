// tests/engine_tests.rs

use gbnf::RuleElement::*;
use gbnf::{compile, GbnfError, GrammarEngine, RuleElement};

// ---
// Recognition scenarios
// ---

#[test]
fn test_two_token_sequence() {
    let engine = compile(r#"root ::= "a" "b""#).unwrap();
    assert!(engine.recognizes("ab"));
    assert!(!engine.recognizes("a"));
    assert!(!engine.recognizes("ba"));
    assert!(!engine.recognizes("abb"));
    assert!(!engine.recognizes(""));
}

#[test]
fn test_alternation() {
    let engine = compile(r#"root ::= "cat" | "dog""#).unwrap();
    assert!(engine.recognizes("cat"));
    assert!(engine.recognizes("dog"));
    assert!(!engine.recognizes("cow"));
    assert!(!engine.recognizes("catdog"));
}

#[test]
fn test_star_accepts_empty_input() {
    let engine = compile(r#"root ::= "ab"*"#).unwrap();
    assert!(engine.recognizes(""));
    assert!(engine.recognizes("ab"));
    assert!(engine.recognizes("ababab"));
    assert!(!engine.recognizes("aba"));
}

#[test]
fn test_plus_rejects_empty_input() {
    let engine = compile(r#"root ::= "a"+"#).unwrap();
    assert!(!engine.recognizes(""));
    assert!(engine.recognizes("a"));
    assert!(engine.recognizes("aaaa"));
}

#[test]
fn test_optional() {
    let engine = compile(r#"root ::= "a"? "b""#).unwrap();
    assert!(engine.recognizes("b"));
    assert!(engine.recognizes("ab"));
    assert!(!engine.recognizes("aab"));
}

#[test]
fn test_char_class_ranges() {
    let engine = compile("root ::= [a-z0-9]").unwrap();
    assert!(engine.recognizes("q"));
    assert!(engine.recognizes("7"));
    assert!(!engine.recognizes("Q"));
    assert!(!engine.recognizes("qq"));
}

#[test]
fn test_negated_char_class() {
    let engine = compile("root ::= [^a-z]").unwrap();
    assert!(engine.recognizes("A"));
    assert!(engine.recognizes("!"));
    assert!(!engine.recognizes("m"));
}

#[test]
fn test_recursive_rule_matches_nesting() {
    let engine = compile(r#"root ::= "(" root ")" | """#).unwrap();
    assert!(engine.recognizes(""));
    assert!(engine.recognizes("()"));
    assert!(engine.recognizes("((()))"));
    assert!(!engine.recognizes("(()"));
    assert!(!engine.recognizes(")("));
}

#[test]
fn test_multi_rule_grammar() {
    let text = "\
root  ::= value (\",\" value)*
value ::= digit+
digit ::= [0-9]
";
    let engine = compile(text).unwrap();
    assert!(engine.recognizes("1"));
    assert!(engine.recognizes("12,345,6"));
    assert!(!engine.recognizes("12,"));
    assert!(!engine.recognizes(",12"));
    assert!(!engine.recognizes("1,a"));
}

#[test]
fn test_unicode_terminals() {
    let engine = compile("root ::= \"né\" [α-ω]").unwrap();
    assert!(engine.recognizes("néβ"));
    assert!(!engine.recognizes("neβ"));
}

// ---
// Matcher sessions
// ---

#[test]
fn test_matcher_steps_and_completion() {
    let engine = compile(r#"root ::= "a" "b""#).unwrap();
    let mut matcher = engine.matcher();

    assert!(matcher.allows_char('a'));
    assert!(!matcher.allows_char('b'));
    assert!(!matcher.is_complete());

    assert!(matcher.accept_char('a'));
    assert!(matcher.allows_char('b'));

    assert!(matcher.accept_char('b'));
    assert!(matcher.is_complete());

    // Dead after a mismatch.
    assert!(!matcher.accept_char('c'));
    assert!(!matcher.is_complete());
}

#[test]
fn test_concurrent_matchers_are_independent() {
    let engine = compile(r#"root ::= "a"+"#).unwrap();
    let mut first = engine.matcher();
    let mut second = engine.matcher();

    assert!(first.accept_char('a'));
    assert!(first.is_complete());
    assert!(!second.is_complete());
    assert!(second.accept_char('a'));
    assert!(second.accept_char('a'));
    assert!(second.is_complete());
}

// ---
// Construction failures
// ---

#[test]
fn test_dangling_reference_fails_construction() {
    let error = compile("root ::= missing").unwrap_err();
    assert!(matches!(
        error,
        GbnfError::UndefinedRuleReference { rule: 0, target: 1 }
    ));
}

#[test]
fn test_root_referenced_but_never_defined() {
    // "root" exists in the symbol table, but only as a reference; the
    // dangling reference is caught during table validation.
    let error = compile("start ::= root").unwrap_err();
    assert!(matches!(
        error,
        GbnfError::UndefinedRuleReference { rule: 0, target: 1 }
    ));
}

#[test]
fn test_hand_built_table_without_terminator_is_rejected() {
    let root: Vec<RuleElement> = vec![Char('a')];
    let result = GrammarEngine::new(&[&root], 0);
    assert!(matches!(result, Err(GbnfError::MalformedRule { rule: 0 })));
}

#[test]
fn test_hand_built_table_with_orphan_chain_element_is_rejected() {
    let root: Vec<RuleElement> = vec![CharAlt('a'), End];
    let result = GrammarEngine::new(&[&root], 0);
    assert!(matches!(result, Err(GbnfError::MalformedRule { rule: 0 })));
}

#[test]
fn test_left_recursive_grammar_does_not_overflow() {
    // Degenerate self-reference; construction and matching must terminate.
    let engine = compile(r#"root ::= root "a" | "a""#).unwrap();
    let _ = engine.recognizes("aaa");
}
