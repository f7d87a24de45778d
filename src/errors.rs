//! Unified diagnostics for the grammar compiler.
//!
//! Every failure in the parse / resolve / construct chain is a [`GbnfError`],
//! a `miette`-backed diagnostic that carries the grammar source text and a
//! span where one exists. [`ErrorCategory`] groups the variants into the
//! three externally observable failure kinds: parse failure, missing
//! required symbol, and engine construction failure.

use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Source text carried alongside errors for diagnostic rendering.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to a NamedSource for miette error reporting.
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

/// All failures the compiler can produce.
#[derive(Error, Diagnostic, Debug)]
pub enum GbnfError {
    #[error("parse error: {message}")]
    #[diagnostic(code(gbnf::parse::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("invalid syntax here")]
        span: SourceSpan,
    },

    #[error("parse error: invalid escape sequence '{sequence}'")]
    #[diagnostic(
        code(gbnf::parse::escape),
        help(r#"valid escapes are \n, \t, \r, \", \\, \[, \], \xHH, \uHHHH and \UHHHHHHHH"#)
    )]
    InvalidEscape {
        sequence: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("in this literal")]
        span: SourceSpan,
    },

    #[error("parse error: empty character class")]
    #[diagnostic(code(gbnf::parse::empty_class))]
    EmptyCharClass {
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("this class matches nothing")]
        span: SourceSpan,
    },

    #[error("parse error: duplicate definition of rule '{name}'")]
    #[diagnostic(code(gbnf::parse::duplicate_rule))]
    DuplicateRule {
        name: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("redefined here")]
        span: SourceSpan,
    },

    #[error("grammar defines no 'root' rule")]
    #[diagnostic(
        code(gbnf::compile::missing_root),
        help("matching starts at the rule named 'root'; every grammar must define one")
    )]
    MissingRootSymbol {
        #[source_code]
        src: Arc<NamedSource<String>>,
    },

    #[error("rule {rule} references undefined rule {target}")]
    #[diagnostic(code(gbnf::engine::undefined_reference))]
    UndefinedRuleReference { rule: usize, target: usize },

    #[error("malformed rule table entry {rule}")]
    #[diagnostic(code(gbnf::engine::malformed_rule))]
    MalformedRule { rule: usize },

    #[error("start symbol {root} is not a defined rule")]
    #[diagnostic(code(gbnf::engine::invalid_root))]
    InvalidRootIndex { root: usize },
}

/// Failure kinds as observed by callers of the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The grammar text violates GBNF syntax.
    Parse,
    /// The grammar parsed but names no `root` rule.
    MissingSymbol,
    /// The rule table is structurally invalid for the engine.
    Construction,
}

impl GbnfError {
    /// The coarse failure kind, for callers that dispatch on it.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax { .. }
            | Self::InvalidEscape { .. }
            | Self::EmptyCharClass { .. }
            | Self::DuplicateRule { .. } => ErrorCategory::Parse,

            Self::MissingRootSymbol { .. } => ErrorCategory::MissingSymbol,

            Self::UndefinedRuleReference { .. }
            | Self::MalformedRule { .. }
            | Self::InvalidRootIndex { .. } => ErrorCategory::Construction,
        }
    }
}

/// Prints a GbnfError with full miette diagnostics.
///
/// Use this for user-facing error display in CLI contexts.
pub fn print_error(error: GbnfError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
