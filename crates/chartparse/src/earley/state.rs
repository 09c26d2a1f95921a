//! Parse states (Earley items) and the operations that derive new ones

use crate::earley::chart::Chart;
use crate::grammar::{Associativity, Grammar, Precedence, RuleId, Semantics};
use crate::intern::Symbol;
use crate::lexer::Token;
use smallvec::SmallVec;

/// Stable index of a state in its chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// `None` once the index no longer fits
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

/// A symbol of the matched prefix together with what it was bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Matched {
    /// A terminal bound to the token at `index`
    Token { symbol: Symbol, index: usize },
    /// A nonterminal bound to the completed state `state`
    Node { symbol: Symbol, state: StateId },
}

impl Matched {
    #[must_use]
    pub const fn symbol(&self) -> Symbol {
        match *self {
            Self::Token { symbol, .. } | Self::Node { symbol, .. } => symbol,
        }
    }
}

/// One entry of a derivation's history vector.
///
/// Histories are not stored; [`History`](crate::earley::History) walks them
/// out of the derivation DAG. A history interleaves two kinds of entries in
/// input order: a shift entry
/// for every token the derivation consumed, carrying the token's
/// precedence, and a reduction entry for every self-referential rule it
/// completed, carrying the rule's precedence. Two derivations of the same
/// input first differ where one reduced and the other shifted on, which is
/// exactly the choice precedence and associativity decide.
///
/// `left` counts operands bound on the entry's left (1 for a reduction, 0
/// for a shift); `right` counts operands still open on its right (0 for a
/// reduction, 1 for a shift).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rank {
    pub precedence: u32,
    pub associativity: Associativity,
    pub left: u32,
    pub right: u32,
}

impl Rank {
    /// Entry for a completed self-referential rule
    #[must_use]
    pub const fn reduction(precedence: Precedence) -> Self {
        Self {
            precedence: precedence.level,
            associativity: precedence.associativity,
            left: 1,
            right: 0,
        }
    }

    /// Entry for a consumed token
    #[must_use]
    pub const fn shift(precedence: Precedence) -> Self {
        Self {
            precedence: precedence.level,
            associativity: precedence.associativity,
            left: 0,
            right: 1,
        }
    }

    #[must_use]
    pub const fn is_shift(&self) -> bool {
        self.right > 0
    }
}

/// Structural identity of a state: `x`, `ab`, `cd` and origin
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct StateKey {
    x: Symbol,
    ab: SmallVec<[Matched; 4]>,
    cd: SmallVec<[Symbol; 4]>,
    origin: usize,
}

/// `x -> ab . cd from j`
#[derive(Debug, Clone)]
pub struct ParseState<V> {
    x: Symbol,
    rule: RuleId,
    ab: SmallVec<[Matched; 4]>,
    cd: SmallVec<[Symbol; 4]>,
    origin: usize,
    processed: bool,
    container: Option<V>,
    rank: Option<Rank>,
    /// Scan successor waiting for this state to survive resolution
    shift: Option<Box<ParseState<V>>>,
}

impl<V> ParseState<V> {
    /// `lhs -> . rhs from origin` for `rule`
    #[must_use]
    pub fn initial(grammar: &Grammar, rule: RuleId, origin: usize) -> Self {
        let grammar_rule = grammar.rule(rule);
        Self {
            x: grammar_rule.lhs(),
            rule,
            ab: SmallVec::new(),
            cd: grammar_rule.rhs().iter().copied().collect(),
            origin,
            processed: false,
            container: None,
            rank: None,
            shift: None,
        }
    }

    /// Symbol being derived
    #[must_use]
    pub const fn x(&self) -> Symbol {
        self.x
    }

    #[must_use]
    pub const fn rule(&self) -> RuleId {
        self.rule
    }

    /// Matched prefix
    #[must_use]
    pub fn ab(&self) -> &[Matched] {
        &self.ab
    }

    /// Remaining suffix
    #[must_use]
    pub fn cd(&self) -> &[Symbol] {
        &self.cd
    }

    /// Column in which the derivation began
    #[must_use]
    pub const fn origin(&self) -> usize {
        self.origin
    }

    #[must_use]
    pub const fn is_processed(&self) -> bool {
        self.processed
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cd.is_empty()
    }

    #[must_use]
    pub fn next_symbol(&self) -> Option<Symbol> {
        self.cd.first().copied()
    }

    /// Semantic value, present once the state is complete
    #[must_use]
    pub const fn container(&self) -> Option<&V> {
        self.container.as_ref()
    }

    /// This state's own rank, if it is a completed self-referential rule
    #[must_use]
    pub const fn rank(&self) -> Option<Rank> {
        self.rank
    }

    #[must_use]
    pub const fn has_pending_shift(&self) -> bool {
        self.shift.is_some()
    }

    pub(crate) fn key(&self) -> StateKey {
        StateKey {
            x: self.x,
            ab: self.ab.clone(),
            cd: self.cd.clone(),
            origin: self.origin,
        }
    }

    pub(crate) fn mark_processed(&mut self) {
        self.processed = true;
    }

    pub(crate) fn defer_shift(&mut self, successor: Self) {
        self.shift = Some(Box::new(successor));
    }

    pub(crate) fn take_shift(&mut self) -> Option<Self> {
        self.shift.take().map(|successor| *successor)
    }

    /// Whether this state has the shape of `rule`'s completed item from
    /// column 0
    pub(crate) fn accepts(&self, grammar: &Grammar, rule: RuleId) -> bool {
        let grammar_rule = grammar.rule(rule);
        self.origin == 0
            && self.is_complete()
            && self.x == grammar_rule.lhs()
            && self.ab.len() == grammar_rule.rhs().len()
            && self
                .ab
                .iter()
                .zip(grammar_rule.rhs())
                .all(|(matched, &symbol)| matched.symbol() == symbol)
    }

    /// Move the next expected symbol into the matched prefix
    fn advance(&self, matched: Matched) -> Self {
        let mut ab = self.ab.clone();
        ab.push(matched);
        Self {
            x: self.x,
            rule: self.rule,
            ab,
            cd: self.cd.iter().skip(1).copied().collect(),
            origin: self.origin,
            processed: false,
            container: None,
            rank: None,
            shift: None,
        }
    }

    /// Prediction: `c -> . rhs from column` for every rule deriving the
    /// next expected symbol `c`
    pub fn closure<'g>(
        &self,
        grammar: &'g Grammar,
        column: usize,
    ) -> impl Iterator<Item = Self> + 'g {
        let rules = self
            .next_symbol()
            .map_or(&[][..], |symbol| grammar.rules_for(symbol));
        rules
            .iter()
            .map(move |&rule| Self::initial(grammar, rule, column))
    }

    /// Scan: the successor consuming the token at `index`, if its type is the
    /// next expected symbol
    #[must_use]
    pub fn shift(&self, kind: Option<Symbol>, index: usize) -> Option<Self> {
        let expected = self.next_symbol()?;
        (kind? == expected).then(|| {
            self.advance(Matched::Token {
                symbol: expected,
                index,
            })
        })
    }

    /// Completion: advance every state of the origin column that waits for
    /// this state's symbol. `id` is this state's own index in `chart`.
    #[must_use]
    pub fn reductions(&self, id: StateId, chart: &Chart<V>) -> Vec<Self> {
        if !self.is_complete() {
            return Vec::new();
        }
        chart
            .waiting(self.origin, self.x)
            .iter()
            .map(|&caller| {
                chart.state(caller).advance(Matched::Node {
                    symbol: self.x,
                    state: id,
                })
            })
            .collect()
    }

    /// Fill in the container and reduction rank of a freshly completed state.
    ///
    /// Incomplete states are left untouched.
    pub(crate) fn finalize<S>(
        &mut self,
        grammar: &Grammar,
        chart: &Chart<V>,
        tokens: &[Token<V>],
        semantics: &S,
    ) where
        S: Semantics<Value = V>,
        V: Clone + std::fmt::Debug,
    {
        if !self.is_complete() {
            return;
        }

        let children: Option<Vec<V>> = self
            .ab
            .iter()
            .map(|matched| match *matched {
                Matched::Token { index, .. } => {
                    tokens.get(index).map(|token| semantics.terminal(token))
                }
                Matched::Node { state, .. } => chart.state(state).container.clone(),
            })
            .collect();
        let grammar_rule = grammar.rule(self.rule);
        self.container = children.map(|values| semantics.reduce(grammar_rule.action(), values));

        if grammar_rule.is_self_referential() {
            let rank = Rank::reduction(Precedence {
                level: grammar_rule.precedence(),
                associativity: grammar_rule.associativity(),
            });
            self.rank = Some(rank);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earley::history::History;
    use crate::grammar::{GrammarBuilder, NoSemantics};

    fn grammar() -> Grammar {
        GrammarBuilder::new()
            .rule("start", ["exp"], "start")
            .rule("exp", ["exp", "+", "exp"], "add")
            .rule("exp", ["NUMBER"], "num")
            .build()
            .expect("valid grammar")
    }

    #[test]
    fn test_closure_predicts_every_alternative() {
        let grammar = grammar();
        let start = ParseState::<()>::initial(&grammar, grammar.start(), 0);
        let predicted: Vec<_> = start.closure(&grammar, 0).collect();

        assert_eq!(predicted.len(), 2);
        assert!(predicted.iter().all(|state| state.origin() == 0));
        assert!(predicted.iter().all(|state| state.ab().is_empty()));
        assert_eq!(predicted[0].rule().index(), 1);
        assert_eq!(predicted[1].rule().index(), 2);
    }

    #[test]
    fn test_shift_requires_matching_type() {
        let grammar = grammar();
        let number = grammar.symbol("NUMBER");
        let plus = grammar.symbol("+");
        let state = ParseState::<()>::initial(&grammar, RuleId::from_index(2), 0);

        assert!(state.shift(plus, 0).is_none());
        assert!(state.shift(None, 0).is_none());

        let shifted = state.shift(number, 0).expect("NUMBER matches");
        assert!(shifted.is_complete());
        assert_eq!(shifted.ab().len(), 1);
        assert!(!shifted.is_processed());
        assert_eq!(shifted.rank(), None);
    }

    #[test]
    fn test_completion_advances_callers() {
        let grammar = grammar();
        let number = grammar.symbol("NUMBER");
        let mut chart = Chart::<()>::new(2);
        let tokens = vec![Token::new("NUMBER")];

        chart.add(0, ParseState::initial(&grammar, grammar.start(), 0));
        chart.add(0, ParseState::initial(&grammar, RuleId::from_index(1), 0));
        let num = ParseState::initial(&grammar, RuleId::from_index(2), 0);
        let mut shifted = num.shift(number, 0).expect("NUMBER matches");
        shifted.finalize(&grammar, &chart, &tokens, &NoSemantics);
        let id = chart.insert(1, shifted).expect("new state");

        let completed = chart.state(id).reductions(id, &chart);
        assert_eq!(completed.len(), 2);
        assert!(completed[0].is_complete());
        assert_eq!(completed[1].cd().len(), 2);
        assert!(completed.iter().all(|state| matches!(
            state.ab()[0],
            Matched::Node { state, .. } if state == id
        )));
    }

    #[test]
    fn test_self_referential_completion_records_rank() {
        let grammar = grammar();
        let number = grammar.symbol("NUMBER");
        let plus = grammar.symbol("+");
        let tokens = vec![Token::new("NUMBER"), Token::new("+"), Token::new("NUMBER")];
        let mut chart = Chart::<()>::new(4);

        let mut left = ParseState::initial(&grammar, RuleId::from_index(2), 0)
            .shift(number, 0)
            .expect("NUMBER matches");
        left.finalize(&grammar, &chart, &tokens, &NoSemantics);
        let left = chart.insert(1, left).expect("new state");

        let mut right = ParseState::initial(&grammar, RuleId::from_index(2), 2)
            .shift(number, 2)
            .expect("NUMBER matches");
        right.finalize(&grammar, &chart, &tokens, &NoSemantics);
        let right = chart.insert(3, right).expect("new state");

        let add = ParseState::<()>::initial(&grammar, RuleId::from_index(1), 0);
        let add = add.advance(Matched::Node {
            symbol: add.x(),
            state: left,
        });
        let add = add.shift(plus, 1).expect("+ matches");
        let mut add = add.advance(Matched::Node {
            symbol: add.x(),
            state: right,
        });
        add.finalize(&grammar, &chart, &tokens, &NoSemantics);

        let expected = Rank {
            precedence: 0,
            associativity: Associativity::Left,
            left: 1,
            right: 0,
        };
        assert_eq!(add.rank(), Some(expected));
        let history: Vec<Rank> = History::new(&grammar, &chart, &add).collect();
        let shifts: Vec<_> = history.iter().map(Rank::is_shift).collect();
        assert_eq!(shifts, vec![true, true, true, false]);
        assert_eq!(history.last(), Some(&expected));
        assert_eq!(history[0], Rank::shift(Precedence::default()));
        assert!(add.accepts(&grammar, RuleId::from_index(1)));
        assert!(!add.accepts(&grammar, grammar.start()));
        assert_eq!(add.container(), Some(&()));
    }
}
