//! gbnf: a compiler and execution engine for GBNF grammars.
//!
//! The pipeline is a single linear transformation: grammar text is parsed
//! into a transient [`ParseState`], the lowered rule table and the id of the
//! `root` symbol are projected out of it, and both are handed to
//! [`GrammarEngine`] construction. [`compile`] performs the whole chain in
//! one call; the [`ffi`] module exposes the same operation across a C ABI
//! as an opaque, caller-owned handle.

pub use crate::errors::{print_error, ErrorCategory, GbnfError, SourceContext};

pub mod builder;
pub mod cli;
pub mod engine;
pub mod errors;
pub mod ffi;
pub mod grammar;
pub mod syntax;

pub use builder::{compile, ROOT_SYMBOL};
pub use engine::{GrammarEngine, Matcher};
pub use grammar::RuleElement;
pub use syntax::ParseState;
