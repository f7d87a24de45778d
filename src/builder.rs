//! The grammar handle builder: text in, engine out.
//!
//! Deliberately thin glue over the two collaborators: parse the text,
//! project the rule table out of the parse state, resolve the `root`
//! symbol, construct the engine. Nothing is recovered locally; each failure
//! surfaces to the caller with its own error category.

use crate::engine::GrammarEngine;
use crate::errors::{GbnfError, SourceContext};
use crate::syntax::parser;

/// The designated entry-point rule every grammar must define.
pub const ROOT_SYMBOL: &str = "root";

/// Compiles grammar source text into a ready-to-use [`GrammarEngine`].
///
/// A grammar that parses but defines no `root` rule fails with
/// [`GbnfError::MissingRootSymbol`]; this is an ordinary recoverable error,
/// not a precondition violation. The transient parse state is dropped
/// before this returns, after engine construction has copied the rule
/// table out of it.
pub fn compile(text: &str) -> Result<GrammarEngine, GbnfError> {
    let source = SourceContext::from_text("grammar", text);
    let state = parser::parse(text, source.clone())?;

    let rule_views = state.rule_views();
    let root_id = *state
        .symbol_ids
        .get(ROOT_SYMBOL)
        .ok_or_else(|| GbnfError::MissingRootSymbol {
            src: source.to_named_source(),
        })?;

    GrammarEngine::new(&rule_views, root_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;

    #[test]
    fn test_compile_returns_engine() {
        let engine = compile(r#"root ::= "a""#).unwrap();
        assert!(engine.recognizes("a"));
    }

    #[test]
    fn test_missing_root_is_distinct() {
        let error = compile(r#"start ::= "a""#).unwrap_err();
        assert_eq!(error.category(), ErrorCategory::MissingSymbol);
    }
}
