//! Complex points
//!
//! A complex point is a position in a rule right after which competing
//! derivations of an ambiguous symbol may have to be collapsed. Symbols
//! with complex points have their completed derivations collapsed per span
//! while a column is built, and the end-of-column resolution runs on
//! states sitting exactly at a complex point.

use crate::error::GrammarError;
use crate::grammar::{Grammar, RuleId};
use crate::intern::Symbol;
use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::collections::BTreeMap;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Complex-point layout: `(rule index, position)` pairs grouped by
/// the ambiguous symbol found at that position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct ComplexPoints {
    points: BTreeMap<CompactString, Vec<(usize, usize)>>,
}

impl ComplexPoints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register position `position` of rule `rule` under `symbol`
    pub fn insert(&mut self, symbol: &str, rule: usize, position: usize) {
        let entry = self.points.entry(symbol.into()).or_default();
        if !entry.contains(&(rule, position)) {
            entry.push((rule, position));
        }
    }

    /// Compute the complex points of a grammar.
    ///
    /// A rule whose right-hand side contains its own left-hand side is
    /// ambiguous, and its left-hand side is an ambiguous symbol. Every
    /// occurrence of an ambiguous symbol on the right-hand side of a rule
    /// deriving a *different* symbol is a complex point.
    #[must_use]
    pub fn derive(grammar: &Grammar) -> Self {
        let mut points = Self::new();
        for (id, rule) in grammar.rules() {
            for (position, &symbol) in rule.rhs().iter().enumerate() {
                if symbol != rule.lhs() && grammar.is_ambiguous(symbol) {
                    points.insert(grammar.name(symbol), id.index(), position);
                }
            }
        }
        points
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(usize, usize)])> {
        self.points
            .iter()
            .map(|(symbol, points)| (symbol.as_str(), points.as_slice()))
    }

    /// Positions registered under `symbol`
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&[(usize, usize)]> {
        self.points.get(symbol).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Read-only lookup of complex points by rule, used during parsing
#[derive(Debug, Clone, Default)]
pub struct ComplexPointTable {
    points: HashMap<RuleId, SmallVec<[usize; 2]>>,
    /// symbols the points are filed under
    symbols: HashSet<Symbol>,
}

impl ComplexPointTable {
    /// Validate a layout against `grammar` and compile it.
    ///
    /// # Errors
    ///
    /// [`GrammarError::UnknownSymbol`] for a symbol the grammar never uses,
    /// [`GrammarError::ComplexPointRuleOutOfRange`] and
    /// [`GrammarError::ComplexPointPositionOutOfRange`] for indices outside
    /// the grammar, [`GrammarError::ComplexPointSymbolMismatch`] when the
    /// rule holds a different symbol at that position.
    pub fn compile(grammar: &Grammar, points: &ComplexPoints) -> Result<Self, GrammarError> {
        let mut table = Self::default();
        for (name, positions) in points.iter() {
            let Some(symbol) = grammar.symbol(name) else {
                return Err(GrammarError::UnknownSymbol {
                    symbol: name.into(),
                });
            };
            for &(rule, position) in positions {
                let Some(grammar_rule) = grammar.get_rule(rule) else {
                    return Err(GrammarError::ComplexPointRuleOutOfRange {
                        rule,
                        rules: grammar.len(),
                    });
                };
                let Some(&found) = grammar_rule.rhs().get(position) else {
                    return Err(GrammarError::ComplexPointPositionOutOfRange {
                        rule,
                        position,
                        len: grammar_rule.rhs().len(),
                    });
                };
                if found != symbol {
                    return Err(GrammarError::ComplexPointSymbolMismatch {
                        symbol: name.into(),
                        rule,
                        position,
                        found: grammar.name(found).into(),
                    });
                }
                table.insert(RuleId::from_index(rule), position, symbol);
            }
        }
        Ok(table)
    }

    /// Table of the points [`ComplexPoints::derive`] finds in `grammar`
    #[must_use]
    pub fn for_grammar(grammar: &Grammar) -> Self {
        let mut table = Self::default();
        for (id, rule) in grammar.rules() {
            for (position, &symbol) in rule.rhs().iter().enumerate() {
                if symbol != rule.lhs() && grammar.is_ambiguous(symbol) {
                    table.insert(id, position, symbol);
                }
            }
        }
        table
    }

    fn insert(&mut self, rule: RuleId, position: usize, symbol: Symbol) {
        let positions = self.points.entry(rule).or_default();
        if !positions.contains(&position) {
            positions.push(position);
        }
        self.symbols.insert(symbol);
    }

    /// Whether `position` of `rule` is a complex point
    #[must_use]
    pub fn contains(&self, rule: RuleId, position: usize) -> bool {
        self.points
            .get(&rule)
            .is_some_and(|positions| positions.contains(&position))
    }

    /// Whether `rule` has any complex point
    #[must_use]
    pub fn is_registered(&self, rule: RuleId) -> bool {
        self.points.contains_key(&rule)
    }

    /// Whether completed derivations of `symbol` compete per span.
    ///
    /// True for every symbol some complex point is filed under.
    #[must_use]
    pub fn resolves(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
