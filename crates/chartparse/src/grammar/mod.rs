//! # Grammar Module
//!
//! In-memory grammar consumed by the chart parser.
//!
//! ## Overview
//!
//! - [`GrammarRule`]: one production with its reduction action, precedence
//!   level and associativity. Immutable once constructed.
//! - [`Grammar`]: the ordered, non-empty rule list. Rule 0 is the start rule.
//! - [`PrecedenceTable`]: declared operator tiers.
//! - [`ComplexPoints`] / [`ComplexPointTable`]: rule positions at which
//!   competing derivations are collapsed.
//! - [`Semantics`]: host-owned action dispatch for semantic values.
//!
//! ## Usage
//!
//! ```rust
//! use chartparse::grammar::{Associativity, GrammarBuilder};
//!
//! let grammar = GrammarBuilder::new()
//!     .precedence(Associativity::Left, ["+"])
//!     .precedence(Associativity::Left, ["*"])
//!     .rule("start", ["exp"], "start")
//!     .rule("exp", ["exp", "+", "exp"], "add")
//!     .rule("exp", ["exp", "*", "exp"], "mul")
//!     .rule("exp", ["NUMBER"], "num")
//!     .build()?;
//!
//! assert_eq!(grammar.len(), 4);
//! assert_eq!(grammar.describe_rule(grammar.start()), "start -> exp");
//! # Ok::<(), chartparse::error::GrammarError>(())
//! ```

pub mod builder;
pub mod complex;
pub mod precedence;
pub mod semantics;

pub use builder::*;
pub use complex::*;
pub use precedence::*;
pub use semantics::*;

use crate::error::GrammarError;
use crate::intern::{Symbol, SymbolTable};
use compact_str::CompactString;
use hashbrown::HashMap;
use smallvec::SmallVec;
use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum Associativity {
    #[default]
    Left,
    Right,
}

/// Opaque identifier of a reduction action.
///
/// The engine never interprets it; it is handed back to
/// [`Semantics::reduce`] when a rule completes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct ActionId(CompactString);

impl ActionId {
    #[must_use]
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index of a rule in its grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(u32);

impl RuleId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Only for indices of a built grammar, whose rule count fits in `u32`
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(u32::try_from(index).is_ok(), "rule index {index} overflows");
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

/// One production: `lhs -> rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarRule {
    lhs: Symbol,
    rhs: SmallVec<[Symbol; 4]>,
    action: ActionId,
    precedence: u32,
    associativity: Associativity,
}

impl GrammarRule {
    #[must_use]
    pub fn new(
        lhs: Symbol,
        rhs: impl IntoIterator<Item = Symbol>,
        action: ActionId,
        precedence: u32,
        associativity: Associativity,
    ) -> Self {
        Self {
            lhs,
            rhs: rhs.into_iter().collect(),
            action,
            precedence,
            associativity,
        }
    }

    #[must_use]
    pub const fn lhs(&self) -> Symbol {
        self.lhs
    }

    #[must_use]
    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    #[must_use]
    pub const fn action(&self) -> &ActionId {
        &self.action
    }

    /// Precedence level; higher binds tighter, 0 means undeclared
    #[must_use]
    pub const fn precedence(&self) -> u32 {
        self.precedence
    }

    #[must_use]
    pub const fn associativity(&self) -> Associativity {
        self.associativity
    }

    /// Whether the rule's right-hand side mentions its own left-hand side.
    ///
    /// Such rules are the source of the ambiguities the parser resolves.
    #[must_use]
    pub fn is_self_referential(&self) -> bool {
        self.rhs.contains(&self.lhs)
    }
}

/// An ordered, non-empty list of rules; rule 0 is the start rule.
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<GrammarRule>,
    symbols: SymbolTable,
    precedence: PrecedenceTable,
    /// lhs -> rules deriving it, in grammar order
    by_lhs: HashMap<Symbol, SmallVec<[RuleId; 4]>>,
    /// Terminals without a declared tier that borrow an explicit rule level
    borrowed: HashMap<Symbol, Precedence>,
}

impl Grammar {
    /// Assemble a grammar from already interned rules.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::EmptyGrammar`] for an empty rule list,
    /// [`GrammarError::TooManyRules`] when rule indices would not fit a
    /// [`RuleId`] and [`GrammarError::EmptyRule`] for a rule without
    /// right-hand side.
    pub fn new(
        symbols: SymbolTable,
        rules: Vec<GrammarRule>,
        precedence: PrecedenceTable,
    ) -> Result<Self, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }
        if u32::try_from(rules.len()).is_err() {
            return Err(GrammarError::TooManyRules { count: rules.len() });
        }

        let mut by_lhs: HashMap<Symbol, SmallVec<[RuleId; 4]>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            if rule.rhs.is_empty() {
                return Err(GrammarError::EmptyRule {
                    index,
                    lhs: symbols.resolve(rule.lhs).into(),
                });
            }
            by_lhs
                .entry(rule.lhs)
                .or_default()
                .push(RuleId::from_index(index));
        }

        let mut borrowed = HashMap::new();
        for rule in rules.iter().filter(|rule| rule.precedence > 0) {
            for &symbol in &rule.rhs {
                if by_lhs.contains_key(&symbol) || precedence.get(symbol).is_some() {
                    continue;
                }
                borrowed.entry(symbol).or_insert(Precedence {
                    level: rule.precedence,
                    associativity: rule.associativity,
                });
            }
        }

        Ok(Self {
            rules,
            symbols,
            precedence,
            by_lhs,
            borrowed,
        })
    }

    /// The start rule (always rule 0)
    #[must_use]
    pub const fn start(&self) -> RuleId {
        RuleId(0)
    }

    /// Look up a rule by id
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to a larger grammar. Ids of this grammar come
    /// from [`Grammar::start`], [`Grammar::rule_id`] and the iterators.
    #[must_use]
    pub fn rule(&self, id: RuleId) -> &GrammarRule {
        &self.rules[id.index()]
    }

    #[must_use]
    pub fn get_rule(&self, index: usize) -> Option<&GrammarRule> {
        self.rules.get(index)
    }

    /// Id of the rule at `index`, if there is one
    #[must_use]
    pub fn rule_id(&self, index: usize) -> Option<RuleId> {
        (index < self.rules.len()).then(|| RuleId::from_index(index))
    }

    pub fn rules(&self) -> impl ExactSizeIterator<Item = (RuleId, &GrammarRule)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(index, rule)| (RuleId::from_index(index), rule))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose left-hand side is `symbol`, in grammar order
    #[must_use]
    pub fn rules_for(&self, symbol: Symbol) -> &[RuleId] {
        self.by_lhs.get(&symbol).map_or(&[], |ids| ids.as_slice())
    }

    /// Whether some rule derives `symbol`
    #[must_use]
    pub fn is_nonterminal(&self, symbol: Symbol) -> bool {
        self.by_lhs.contains_key(&symbol)
    }

    /// Whether `symbol` is the left-hand side of a self-referential rule
    #[must_use]
    pub fn is_ambiguous(&self, symbol: Symbol) -> bool {
        self.rules_for(symbol)
            .iter()
            .any(|&id| self.rule(id).is_self_referential())
    }

    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Look up a symbol by name
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name)
    }

    /// Name of a symbol
    #[must_use]
    pub fn name(&self, symbol: Symbol) -> &str {
        self.symbols.resolve(symbol)
    }

    #[must_use]
    pub const fn precedence(&self) -> &PrecedenceTable {
        &self.precedence
    }

    /// Precedence of a terminal when it is shifted.
    ///
    /// The declared tier if there is one. Otherwise the level of the first
    /// rule with a nonzero level that uses the terminal, so rules given an
    /// explicit level also rank their operators. Level 0 / `Left` when
    /// neither applies.
    #[must_use]
    pub fn token_precedence(&self, symbol: Symbol) -> Precedence {
        self.precedence
            .get(symbol)
            .or_else(|| self.borrowed.get(&symbol).copied())
            .unwrap_or_default()
    }

    /// Render a rule as `lhs -> a b c`
    #[must_use]
    pub fn describe_rule(&self, id: RuleId) -> String {
        let rule = self.rule(id);
        let mut out = String::from(self.name(rule.lhs));
        out.push_str(" ->");
        for &symbol in rule.rhs() {
            out.push(' ');
            out.push_str(self.name(symbol));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic() -> Grammar {
        GrammarBuilder::new()
            .rule("start", ["exp"], "start")
            .rule("exp", ["exp", "+", "exp"], "add")
            .rule("exp", ["NUMBER"], "num")
            .build()
            .expect("valid grammar")
    }

    #[test]
    fn test_rules_for_keeps_grammar_order() {
        let grammar = arithmetic();
        let exp = grammar.symbol("exp").expect("interned");
        let ids: Vec<_> = grammar.rules_for(exp).iter().map(|id| id.index()).collect();
        assert_eq!(ids, vec![1, 2]);

        let number = grammar.symbol("NUMBER").expect("interned");
        assert!(grammar.rules_for(number).is_empty());
        assert!(!grammar.is_nonterminal(number));
    }

    #[test]
    fn test_self_referential() {
        let grammar = arithmetic();
        assert!(!grammar.rule(RuleId(0)).is_self_referential());
        assert!(grammar.rule(RuleId(1)).is_self_referential());
        assert!(!grammar.rule(RuleId(2)).is_self_referential());

        let exp = grammar.symbol("exp").expect("interned");
        let start = grammar.symbol("start").expect("interned");
        assert!(grammar.is_ambiguous(exp));
        assert!(!grammar.is_ambiguous(start));
    }

    #[test]
    fn test_token_precedence() {
        let grammar = GrammarBuilder::new()
            .precedence(Associativity::Left, ["-"])
            .precedence(Associativity::Right, ["UMINUS"])
            .rule("start", ["exp"], "start")
            .rule("exp", ["exp", "-", "exp"], "sub")
            .rule_with_precedence("exp", ["exp", "@", "exp"], "at", 2, Associativity::Right)
            .rule_with_precedence_of("exp", ["-", "exp"], "neg", "UMINUS")
            .rule("exp", ["NUMBER"], "num")
            .build()
            .expect("valid grammar");
        let lookup = |name| grammar.token_precedence(grammar.symbol(name).expect("interned"));

        assert_eq!(lookup("-").level, 1);
        assert_eq!(
            lookup("@"),
            Precedence {
                level: 2,
                associativity: Associativity::Right
            }
        );
        assert_eq!(lookup("NUMBER"), Precedence::default());
    }

    #[test]
    fn test_rule_id_checks_range() {
        let grammar = arithmetic();
        assert_eq!(grammar.rule_id(2), Some(RuleId(2)));
        assert_eq!(grammar.rule_id(3), None);
        assert_eq!(grammar.rule_id(usize::MAX), None);
    }

    #[test]
    fn test_empty_grammar_rejected() {
        let err = Grammar::new(SymbolTable::new(), Vec::new(), PrecedenceTable::default())
            .unwrap_err();
        assert_eq!(err, GrammarError::EmptyGrammar);
    }

    #[test]
    fn test_empty_rule_rejected() {
        let mut symbols = SymbolTable::new();
        let a = symbols.intern("a");
        let rule = GrammarRule::new(a, [], ActionId::from("a"), 0, Associativity::Left);
        let err = Grammar::new(symbols, vec![rule], PrecedenceTable::default()).unwrap_err();
        assert_eq!(
            err,
            GrammarError::EmptyRule {
                index: 0,
                lhs: "a".into()
            }
        );
    }
}
