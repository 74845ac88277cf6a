//! Typed sequence elements
//!
//! Pattern files spell sequence positions as plain strings; those are
//! compiled at load time into a closed element type evaluated by a
//! bounded, non-backtracking matcher. Matching is case-sensitive
//! throughout: uppercase and lowercase roman numerals are distinct
//! chords.

use std::collections::BTreeMap;

/// Table of allowed substitutions per roman numeral, from a style profile
pub type SubstitutionTable = BTreeMap<String, Vec<String>>;

/// One position of a pattern sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceElement {
    /// Matches any symbol ("*")
    Any,
    /// Matches symbols starting with the given text ("V/*" matches any
    /// secondary dominant)
    Prefix(String),
    /// Matches any of the listed alternatives ("IV|iv")
    OneOf(Vec<String>),
    /// Matches exactly one symbol
    Exact(String),
}

impl SequenceElement {
    /// Compile a pattern-file element string
    ///
    /// `"*"` becomes [`Any`](Self::Any), a trailing `*` becomes
    /// [`Prefix`](Self::Prefix), `|`-separated text becomes
    /// [`OneOf`](Self::OneOf), anything else is [`Exact`](Self::Exact).
    pub fn parse(text: &str) -> Self {
        if text == "*" {
            return SequenceElement::Any;
        }
        if let Some(prefix) = text.strip_suffix('*') {
            return SequenceElement::Prefix(prefix.to_string());
        }
        if text.contains('|') {
            return SequenceElement::OneOf(
                text.split('|').map(|s| s.to_string()).collect(),
            );
        }
        SequenceElement::Exact(text.to_string())
    }

    /// Test one symbol against this element
    ///
    /// When a substitution table is supplied, exact elements (and each
    /// alternative of a [`OneOf`](Self::OneOf)) also accept any symbol the
    /// active profile lists as a substitute for them.
    pub fn matches(&self, symbol: &str, substitutions: Option<&SubstitutionTable>) -> bool {
        match self {
            SequenceElement::Any => true,
            SequenceElement::Prefix(prefix) => symbol.starts_with(prefix.as_str()),
            SequenceElement::OneOf(alternatives) => alternatives
                .iter()
                .any(|alt| exact_or_substitute(alt, symbol, substitutions)),
            SequenceElement::Exact(expected) => {
                exact_or_substitute(expected, symbol, substitutions)
            }
        }
    }
}

fn exact_or_substitute(
    expected: &str,
    symbol: &str,
    substitutions: Option<&SubstitutionTable>,
) -> bool {
    if expected == symbol {
        return true;
    }
    match substitutions.and_then(|table| table.get(expected)) {
        Some(subs) => subs.iter().any(|s| s == symbol),
        None => false,
    }
}
