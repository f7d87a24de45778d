//! Flat rule element representation shared by the parser and the engine.

use serde::{Deserialize, Serialize};

/// One element of a lowered grammar rule.
///
/// A rule body is a flat sequence: the elements of each alternate in order,
/// alternates separated by [`Alt`](RuleElement::Alt), the whole body
/// terminated by exactly one [`End`](RuleElement::End). A character element
/// may be extended by a chain of [`CharAlt`](RuleElement::CharAlt) and
/// [`CharRangeUpper`](RuleElement::CharRangeUpper) elements that together
/// describe a single character match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleElement {
    /// Terminates a rule body.
    End,
    /// Separates alternates within a rule body.
    Alt,
    /// Matches the rule with the given symbol id.
    RuleRef(usize),
    /// Matches a single character (start of a positive chain).
    Char(char),
    /// Matches any character not covered by the chain starting here.
    NotChar(char),
    /// Widens the preceding chain element to an inclusive range.
    CharRangeUpper(char),
    /// Adds another character (or range start) to the preceding chain.
    CharAlt(char),
}

impl RuleElement {
    /// True for elements that end an alternate (`End` or `Alt`).
    pub fn is_end_of_sequence(&self) -> bool {
        matches!(self, RuleElement::End | RuleElement::Alt)
    }

    /// True for elements that can start a character chain.
    pub fn is_char_start(&self) -> bool {
        matches!(self, RuleElement::Char(_) | RuleElement::NotChar(_))
    }
}
