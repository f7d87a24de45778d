//! Pushdown execution engine for compiled grammars.
//!
//! [`GrammarEngine::new`] copies the borrowed rule views into owned storage
//! and validates them, severing any tie to the parse state that produced
//! them. Matching is a set-of-stacks pushdown recognizer: each stack is a
//! list of element positions whose top is the next element that must match;
//! rule references push the referenced rule's alternates and `End` pops.

use crate::errors::GbnfError;
use crate::grammar::RuleElement;

/// Position of one element within the engine's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ElemPos {
    rule: usize,
    idx: usize,
}

/// Depth bound for stack expansion. Expansion paths nested deeper than this
/// (only reachable through degenerate self-referential rules) are dropped
/// instead of recursed into, so pathological grammars cannot overflow the
/// call stack.
const MAX_ADVANCE_DEPTH: usize = 256;

/// A compiled grammar, ready to answer recognition queries.
///
/// Engines hold no shared mutable state: two engines built from the same
/// text are fully independent, and one engine can serve any number of
/// concurrent [`Matcher`] sessions.
#[derive(Debug)]
pub struct GrammarEngine {
    rules: Vec<Vec<RuleElement>>,
    root: usize,
    start_stacks: Vec<Vec<ElemPos>>,
}

impl GrammarEngine {
    /// Builds an engine from an ordered rule table and the id of the start
    /// rule.
    ///
    /// The views are copied before anything else, so the storage backing
    /// them is free to drop once this returns. Fails if any rule reference
    /// targets a missing rule, if a rule body is structurally invalid, or
    /// if `root` does not name a defined rule.
    pub fn new(rule_views: &[&[RuleElement]], root: usize) -> Result<Self, GbnfError> {
        let rules: Vec<Vec<RuleElement>> = rule_views.iter().map(|v| v.to_vec()).collect();
        validate_rules(&rules)?;

        if root >= rules.len() || rules[root].is_empty() {
            return Err(GbnfError::InvalidRootIndex { root });
        }

        let mut engine = Self {
            rules,
            root,
            start_stacks: Vec::new(),
        };

        let mut stacks = Vec::new();
        for alt in engine.alternate_starts(root) {
            let pos = ElemPos { rule: root, idx: alt };
            let mut stack = Vec::new();
            if !engine.elem(pos).is_end_of_sequence() {
                stack.push(pos);
            }
            engine.advance_stack(stack, &mut stacks, 0);
        }
        engine.start_stacks = stacks;
        Ok(engine)
    }

    /// Id of the start rule.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Number of rules in the table.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Starts a character-by-character matching session.
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher {
            engine: self,
            stacks: self.start_stacks.clone(),
        }
    }

    /// Whether `text` is a complete match starting from the root rule.
    pub fn recognizes(&self, text: &str) -> bool {
        let mut matcher = self.matcher();
        for c in text.chars() {
            if !matcher.accept_char(c) {
                return false;
            }
        }
        matcher.is_complete()
    }

    fn elem(&self, pos: ElemPos) -> RuleElement {
        self.rules[pos.rule][pos.idx]
    }

    /// Indices where each alternate of `rule` begins.
    fn alternate_starts(&self, rule: usize) -> Vec<usize> {
        let body = &self.rules[rule];
        let mut starts = vec![0];
        for (i, elem) in body.iter().enumerate() {
            match elem {
                RuleElement::Alt => starts.push(i + 1),
                RuleElement::End => break,
                _ => {}
            }
        }
        starts
    }

    /// Expands `stack` until its top is a character element (or it is
    /// empty, meaning a complete match), collecting the results.
    fn advance_stack(&self, stack: Vec<ElemPos>, out: &mut Vec<Vec<ElemPos>>, depth: usize) {
        if depth > MAX_ADVANCE_DEPTH {
            return;
        }
        let Some(&top) = stack.last() else {
            push_unique(out, stack);
            return;
        };

        match self.elem(top) {
            RuleElement::RuleRef(target) => {
                let next = ElemPos {
                    rule: top.rule,
                    idx: top.idx + 1,
                };
                for alt in self.alternate_starts(target) {
                    let mut new_stack = stack.clone();
                    new_stack.pop();
                    if !self.elem(next).is_end_of_sequence() {
                        new_stack.push(next);
                    }
                    let sub = ElemPos { rule: target, idx: alt };
                    if !self.elem(sub).is_end_of_sequence() {
                        new_stack.push(sub);
                    }
                    self.advance_stack(new_stack, out, depth + 1);
                }
            }
            RuleElement::Char(_) | RuleElement::NotChar(_) => push_unique(out, stack),
            // Alt and End never sit on a stack; chain elements are always
            // consumed together with their chain start.
            _ => {}
        }
    }

    /// Evaluates the character chain starting at `pos` against `c`.
    /// Returns whether it matched and the position just past the chain.
    fn match_char(&self, pos: ElemPos, c: char) -> (bool, ElemPos) {
        let body = &self.rules[pos.rule];
        let negated = matches!(body[pos.idx], RuleElement::NotChar(_));

        let mut idx = pos.idx;
        let mut found = false;
        loop {
            let lo = match body[idx] {
                RuleElement::Char(x) | RuleElement::NotChar(x) | RuleElement::CharAlt(x) => x,
                _ => break,
            };
            if let Some(&RuleElement::CharRangeUpper(hi)) = body.get(idx + 1) {
                found |= lo <= c && c <= hi;
                idx += 2;
            } else {
                found |= c == lo;
                idx += 1;
            }
            if !matches!(body.get(idx), Some(RuleElement::CharAlt(_))) {
                break;
            }
        }

        (found != negated, ElemPos { rule: pos.rule, idx })
    }
}

/// Stateful matcher over a borrowed engine.
///
/// The frontier is the set of surviving stacks; an empty stack in the
/// frontier means the input consumed so far is a complete match.
pub struct Matcher<'g> {
    engine: &'g GrammarEngine,
    stacks: Vec<Vec<ElemPos>>,
}

impl Matcher<'_> {
    /// Feeds one character. Returns false when no stack survives, after
    /// which the session is dead.
    pub fn accept_char(&mut self, c: char) -> bool {
        let mut new_stacks = Vec::new();
        for stack in &self.stacks {
            // An empty stack is a finished match; no character extends it.
            let Some(&top) = stack.last() else { continue };

            let (matched, after) = self.engine.match_char(top, c);
            if !matched {
                continue;
            }
            let mut new_stack = stack.clone();
            new_stack.pop();
            if !self.engine.elem(after).is_end_of_sequence() {
                new_stack.push(after);
            }
            self.engine.advance_stack(new_stack, &mut new_stacks, 0);
        }
        self.stacks = new_stacks;
        !self.stacks.is_empty()
    }

    /// Whether `c` could be accepted next, without advancing the session.
    pub fn allows_char(&self, c: char) -> bool {
        self.stacks
            .iter()
            .filter_map(|stack| stack.last())
            .any(|&top| self.engine.match_char(top, c).0)
    }

    /// Whether the input consumed so far is a complete match.
    pub fn is_complete(&self) -> bool {
        self.stacks.iter().any(|stack| stack.is_empty())
    }
}

fn push_unique(out: &mut Vec<Vec<ElemPos>>, stack: Vec<ElemPos>) {
    if !out.contains(&stack) {
        out.push(stack);
    }
}

/// Structural validation of an incoming rule table: every body must be
/// `End`-terminated with no interior `End`, chain extensions must follow a
/// chain element, and every reference must target a defined rule.
fn validate_rules(rules: &[Vec<RuleElement>]) -> Result<(), GbnfError> {
    for (rule, body) in rules.iter().enumerate() {
        // An empty body is an undefined rule; it only becomes an error
        // when something references it (checked below) or when it is the
        // root (checked by the constructor).
        if body.is_empty() {
            continue;
        }
        if body.last() != Some(&RuleElement::End)
            || body[..body.len() - 1].contains(&RuleElement::End)
        {
            return Err(GbnfError::MalformedRule { rule });
        }

        for (i, elem) in body.iter().enumerate() {
            match *elem {
                RuleElement::RuleRef(target) => {
                    if target >= rules.len() || rules[target].is_empty() {
                        return Err(GbnfError::UndefinedRuleReference { rule, target });
                    }
                }
                RuleElement::CharRangeUpper(_) => {
                    let prev_is_chain = i > 0
                        && matches!(
                            body[i - 1],
                            RuleElement::Char(_)
                                | RuleElement::NotChar(_)
                                | RuleElement::CharAlt(_)
                        );
                    if !prev_is_chain {
                        return Err(GbnfError::MalformedRule { rule });
                    }
                }
                RuleElement::CharAlt(_) => {
                    let prev_is_chain = i > 0
                        && matches!(
                            body[i - 1],
                            RuleElement::Char(_)
                                | RuleElement::NotChar(_)
                                | RuleElement::CharAlt(_)
                                | RuleElement::CharRangeUpper(_)
                        );
                    if !prev_is_chain {
                        return Err(GbnfError::MalformedRule { rule });
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}
