//! Grammar text parsing.
//!
//! [`ParseState`] is the transient result of parsing GBNF source: a symbol
//! table mapping rule names to dense numeric ids, and one lowered rule body
//! per id. It exists only for the duration of a compile call; engine
//! construction consumes borrowed views of the rule table and copies what it
//! needs, after which the state is dropped.

use std::collections::HashMap;

use crate::grammar::RuleElement;

pub mod parser;

/// Transient parsed form of a grammar, prior to engine construction.
#[derive(Debug, Default)]
pub struct ParseState {
    /// Rule name to symbol id, ids assigned densely in first-use order.
    /// A reference to a not-yet-defined rule allocates its id eagerly.
    pub symbol_ids: HashMap<String, usize>,
    names: Vec<String>,
    rules: Vec<Vec<RuleElement>>,
}

impl ParseState {
    /// Id bound to `name`, allocating a fresh one on first use.
    pub(crate) fn symbol_id(&mut self, name: &str) -> usize {
        if let Some(&id) = self.symbol_ids.get(name) {
            return id;
        }
        let id = self.rules.len();
        self.symbol_ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        self.rules.push(Vec::new());
        id
    }

    /// Allocates a synthetic symbol for the anonymous rules produced when
    /// lowering groups and repetition suffixes. Named `{base}_{id}` after
    /// the rule being lowered.
    pub(crate) fn generate_symbol(&mut self, base: &str) -> usize {
        let id = self.rules.len();
        let name = format!("{base}_{id}");
        self.symbol_ids.insert(name.clone(), id);
        self.names.push(name);
        self.rules.push(Vec::new());
        id
    }

    pub(crate) fn set_rule(&mut self, id: usize, body: Vec<RuleElement>) {
        self.rules[id] = body;
    }

    /// Whether a body has been recorded for `id`. An allocated-but-empty
    /// slot means the symbol was referenced but never defined.
    pub(crate) fn is_defined(&self, id: usize) -> bool {
        !self.rules[id].is_empty()
    }

    /// Ordered borrow of every lowered rule body, in symbol id order.
    /// This is the projection handed to engine construction; it must not
    /// outlive the state (the borrow checker enforces this).
    pub fn rule_views(&self) -> Vec<&[RuleElement]> {
        self.rules.iter().map(Vec::as_slice).collect()
    }

    /// Number of symbols discovered (defined or referenced).
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Name bound to a symbol id.
    ///
    /// # Panics
    /// Panics if `id` was never allocated.
    pub fn name_of(&self, id: usize) -> &str {
        &self.names[id]
    }
}
