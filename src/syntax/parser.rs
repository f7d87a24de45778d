//! GBNF text parser.
//!
//! Converts grammar source text into a [`ParseState`]: pest handles the
//! surface syntax, and the lowering pass here flattens every rule body into
//! the engine's element representation. Repetition suffixes and
//! parenthesized groups are lowered by synthesizing anonymous helper rules,
//! so the engine only ever sees sequences, alternation markers, references,
//! character elements, and terminators.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::errors::{GbnfError, SourceContext};
use crate::grammar::RuleElement;
use crate::syntax::ParseState;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct GbnfParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse grammar source text into a transient [`ParseState`].
///
/// Duplicate rule definitions are rejected here; references to rules that
/// are never defined parse successfully and are caught at engine
/// construction.
pub fn parse(source_text: &str, source: SourceContext) -> Result<ParseState, GbnfError> {
    let pairs = GbnfParser::parse(Rule::grammar_text, source_text)
        .map_err(|e| convert_parse_error(e, &source))?;

    let grammar = pairs.peek().unwrap(); // pest guarantees grammar_text exists

    let mut state = ParseState::default();
    for pair in grammar.into_inner() {
        if pair.as_rule() == Rule::rule_def {
            lower_rule_def(pair, &mut state, &source)?;
        }
    }
    Ok(state)
}

// ============================================================================
// LOWERING
// ============================================================================

fn lower_rule_def(
    pair: Pair<Rule>,
    state: &mut ParseState,
    source: &SourceContext,
) -> Result<(), GbnfError> {
    let mut inner = pair.into_inner();
    let name_pair = inner.next().unwrap(); // grammar guarantees rule_name
    let name = name_pair.as_str().to_string();

    let rule_id = state.symbol_id(&name);
    if state.is_defined(rule_id) {
        return Err(GbnfError::DuplicateRule {
            name,
            src: source.to_named_source(),
            span: to_source_span(&name_pair),
        });
    }

    let alternates = inner.next().unwrap(); // grammar guarantees alternates
    let body = lower_alternates(alternates, &name, state, source)?;
    state.set_rule(rule_id, body);
    Ok(())
}

fn lower_alternates(
    pair: Pair<Rule>,
    base: &str,
    state: &mut ParseState,
    source: &SourceContext,
) -> Result<Vec<RuleElement>, GbnfError> {
    let mut out = Vec::new();
    for (i, sequence) in pair.into_inner().enumerate() {
        if i > 0 {
            out.push(RuleElement::Alt);
        }
        for element in sequence.into_inner() {
            lower_element(element, base, state, source, &mut out)?;
        }
    }
    out.push(RuleElement::End);
    Ok(out)
}

fn lower_element(
    pair: Pair<Rule>,
    base: &str,
    state: &mut ParseState,
    source: &SourceContext,
    out: &mut Vec<RuleElement>,
) -> Result<(), GbnfError> {
    let mut inner = pair.into_inner();
    let primary = inner.next().unwrap(); // grammar guarantees a primary
    let repeat = inner.next();

    let start = out.len();
    match primary.as_rule() {
        Rule::literal => lower_literal(&primary, source, out)?,
        Rule::char_class => lower_char_class(&primary, source, out)?,
        Rule::rule_ref => {
            let id = state.symbol_id(primary.as_str());
            out.push(RuleElement::RuleRef(id));
        }
        Rule::group => {
            let alternates = primary.into_inner().next().unwrap(); // group wraps alternates
            let sub_id = state.generate_symbol(base);
            let body = lower_alternates(alternates, base, state, source)?;
            state.set_rule(sub_id, body);
            out.push(RuleElement::RuleRef(sub_id));
        }
        rule => {
            return Err(GbnfError::Syntax {
                message: format!("unsupported element: {rule:?}"),
                src: source.to_named_source(),
                span: to_source_span(&primary),
            })
        }
    }

    if let Some(op) = repeat {
        apply_repetition(&op, start, base, state, source, out)?;
    }
    Ok(())
}

/// Rewrites the primary lowered at `out[start..]` through a synthetic rule:
///
/// ```text
/// S*  -->  S' ::= S S' |
/// S+  -->  S' ::= S S' | S
/// S?  -->  S' ::= S |
/// ```
fn apply_repetition(
    op: &Pair<Rule>,
    start: usize,
    base: &str,
    state: &mut ParseState,
    source: &SourceContext,
    out: &mut Vec<RuleElement>,
) -> Result<(), GbnfError> {
    let sub_id = state.generate_symbol(base);
    let primary: Vec<RuleElement> = out.split_off(start);

    let mut sub = primary.clone();
    match op.as_str() {
        "*" => {
            sub.push(RuleElement::RuleRef(sub_id));
            sub.push(RuleElement::Alt);
        }
        "+" => {
            sub.push(RuleElement::RuleRef(sub_id));
            sub.push(RuleElement::Alt);
            sub.extend(primary.iter().copied());
        }
        "?" => {
            sub.push(RuleElement::Alt);
        }
        other => {
            return Err(GbnfError::Syntax {
                message: format!("unsupported repetition operator: {other}"),
                src: source.to_named_source(),
                span: to_source_span(op),
            })
        }
    }
    sub.push(RuleElement::End);

    state.set_rule(sub_id, sub);
    out.push(RuleElement::RuleRef(sub_id));
    Ok(())
}

fn lower_literal(
    pair: &Pair<Rule>,
    source: &SourceContext,
    out: &mut Vec<RuleElement>,
) -> Result<(), GbnfError> {
    let text = pair.as_str();
    let inner = &text[1..text.len() - 1]; // strip surrounding quotes
    let mut chars = inner.chars().peekable();

    while chars.peek().is_some() {
        let c = unescape_next(&mut chars).map_err(|sequence| GbnfError::InvalidEscape {
            sequence,
            src: source.to_named_source(),
            span: to_source_span(pair),
        })?;
        out.push(RuleElement::Char(c));
    }
    Ok(())
}

fn lower_char_class(
    pair: &Pair<Rule>,
    source: &SourceContext,
    out: &mut Vec<RuleElement>,
) -> Result<(), GbnfError> {
    let text = pair.as_str();
    let inner = &text[1..text.len() - 1]; // strip surrounding brackets
    let mut chars = inner.chars().peekable();

    let negated = chars.peek() == Some(&'^');
    if negated {
        chars.next();
    }

    let escape_error = |sequence: String| GbnfError::InvalidEscape {
        sequence,
        src: source.to_named_source(),
        span: to_source_span(pair),
    };

    let mut first = true;
    while chars.peek().is_some() {
        let lo = unescape_next(&mut chars).map_err(|s| escape_error(s))?;
        out.push(match (first, negated) {
            (true, false) => RuleElement::Char(lo),
            (true, true) => RuleElement::NotChar(lo),
            (false, _) => RuleElement::CharAlt(lo),
        });
        first = false;

        // '-' forms a range only when another class member follows;
        // a trailing '-' is an ordinary member.
        if chars.peek() == Some(&'-') {
            let mut ahead = chars.clone();
            ahead.next();
            if ahead.peek().is_some() {
                chars.next();
                let hi = unescape_next(&mut chars).map_err(|s| escape_error(s))?;
                out.push(RuleElement::CharRangeUpper(hi));
            }
        }
    }

    if first {
        return Err(GbnfError::EmptyCharClass {
            src: source.to_named_source(),
            span: to_source_span(pair),
        });
    }
    Ok(())
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Decodes the next (possibly escaped) character. The caller must have
/// checked that at least one character remains. On failure, returns the
/// offending escape sequence.
fn unescape_next(chars: &mut std::iter::Peekable<std::str::Chars>) -> Result<char, String> {
    let c = chars.next().unwrap();
    if c != '\\' {
        return Ok(c);
    }
    match chars.next() {
        Some('n') => Ok('\n'),
        Some('t') => Ok('\t'),
        Some('r') => Ok('\r'),
        Some('"') => Ok('"'),
        Some('\\') => Ok('\\'),
        Some('[') => Ok('['),
        Some(']') => Ok(']'),
        Some('x') => unescape_hex(chars, 2, "\\x"),
        Some('u') => unescape_hex(chars, 4, "\\u"),
        Some('U') => unescape_hex(chars, 8, "\\U"),
        Some(other) => Err(format!("\\{other}")),
        None => Err("\\".to_string()),
    }
}

fn unescape_hex(
    chars: &mut std::iter::Peekable<std::str::Chars>,
    digits: usize,
    prefix: &str,
) -> Result<char, String> {
    let mut taken = String::new();
    for _ in 0..digits {
        match chars.next() {
            Some(d) if d.is_ascii_hexdigit() => taken.push(d),
            Some(d) => return Err(format!("{prefix}{taken}{d}")),
            None => return Err(format!("{prefix}{taken}")),
        }
    }
    let value = u32::from_str_radix(&taken, 16).map_err(|_| format!("{prefix}{taken}"))?;
    char::from_u32(value).ok_or(format!("{prefix}{taken}"))
}

fn to_source_span(pair: &Pair<Rule>) -> miette::SourceSpan {
    let span = pair.as_span();
    miette::SourceSpan::from(span.start()..span.end())
}

fn convert_parse_error(error: pest::error::Error<Rule>, source: &SourceContext) -> GbnfError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => miette::SourceSpan::from(pos..pos),
        pest::error::InputLocation::Span((start, end)) => miette::SourceSpan::from(start..end),
    };

    // Favor a short, recognizable message over pest's expected-token dump.
    let rendered = error.variant.message().to_string();
    let message = if rendered.contains("expected") {
        rendered
    } else {
        "invalid grammar syntax".to_string()
    };

    GbnfError::Syntax {
        message,
        src: source.to_named_source(),
        span,
    }
}
