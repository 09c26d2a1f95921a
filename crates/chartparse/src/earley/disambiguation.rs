//! Ambiguity resolution
//!
//! Competing derivations are collapsed at two points:
//!
//! - while a column is built, completed states of a symbol that has
//!   complex points compete per span `(symbol, origin)`. Only the best
//!   ranked one is handed to completion, so callers never multiply over
//!   derivations that will lose anyway;
//! - after the column reaches its fixed point, states that just matched the
//!   symbol at a complex point of their rule are grouped by
//!   `(rule, origin, matched length)` and every group keeps one member.
//!
//! Both compare histories with [`higher_rank`].

use crate::earley::chart::Chart;
use crate::earley::history::History;
use crate::earley::state::{ParseState, Rank, StateId};
use crate::error::ParseError;
use crate::grammar::{Associativity, ComplexPointTable, Grammar, RuleId};
use crate::intern::Symbol;
use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

/// Two ranks at the same precedence level with different associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankConflict {
    pub precedence: u32,
    pub first: Associativity,
    pub second: Associativity,
}

/// Whether history `candidate` outranks history `incumbent`.
///
/// Both histories are walked up to the shorter length and the first
/// deciding entry wins:
///
/// - a higher precedence level wins outright;
/// - at equal level, a `Left` entry with the larger `left` rank wins and a
///   `Right` entry with the larger `right` rank wins.
///
/// With [`Rank::reduction`] and [`Rank::shift`] entries this is the usual
/// operator-precedence rule: reduce before a looser operator, shift before
/// a tighter one, and let associativity break the tie.
///
/// Without a deciding entry the incumbent is kept.
///
/// # Errors
///
/// [`RankConflict`] when two entries share a level but not an associativity.
pub fn higher_rank<C, I>(candidate: C, incumbent: I) -> Result<bool, RankConflict>
where
    C: IntoIterator<Item = Rank>,
    I: IntoIterator<Item = Rank>,
{
    for (new, old) in candidate.into_iter().zip(incumbent) {
        if new.precedence != old.precedence {
            return Ok(new.precedence > old.precedence);
        }
        if new.associativity != old.associativity {
            return Err(RankConflict {
                precedence: new.precedence,
                first: old.associativity,
                second: new.associativity,
            });
        }
        let (new, old) = match new.associativity {
            Associativity::Left => (new.left, old.left),
            Associativity::Right => (new.right, old.right),
        };
        if new != old {
            return Ok(new > old);
        }
    }
    Ok(false)
}

/// Competing states of one `(rule, origin, matched length)` group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GroupKey {
    rule: RuleId,
    origin: usize,
    matched: usize,
}

/// Best completed derivation of every span of the column being built
#[derive(Debug, Default)]
pub(crate) struct SpanWinners {
    best: HashMap<(Symbol, usize), StateId>,
    /// beaten before completion ever used them
    superseded: HashSet<StateId>,
}

impl SpanWinners {
    pub(crate) fn is_superseded(&self, id: StateId) -> bool {
        self.superseded.contains(&id)
    }

    pub(crate) fn has_superseded(&self) -> bool {
        !self.superseded.is_empty()
    }
}

/// Collapses competing derivations
#[derive(Debug, Clone, Copy)]
pub struct AmbiguityResolver<'a> {
    grammar: &'a Grammar,
    complex: &'a ComplexPointTable,
}

impl<'a> AmbiguityResolver<'a> {
    #[must_use]
    pub const fn new(grammar: &'a Grammar, complex: &'a ComplexPointTable) -> Self {
        Self { grammar, complex }
    }

    /// Whether `state` has just matched the symbol at one of its rule's
    /// complex points
    #[must_use]
    pub fn has_ambiguity<V>(&self, state: &ParseState<V>) -> bool {
        state
            .ab()
            .len()
            .checked_sub(1)
            .is_some_and(|position| self.complex.contains(state.rule(), position))
    }

    /// Insert `state` into column `column`, unless it is a completed
    /// derivation that loses against the best one of its span.
    ///
    /// Returns the id of the inserted state. A winner that replaces an
    /// incumbent not yet used by completion marks the incumbent superseded.
    /// An incumbent that was already used stays, and the end-of-column
    /// resolution settles between the callers built from both.
    pub(crate) fn insert<V>(
        &self,
        chart: &mut Chart<V>,
        column: usize,
        winners: &mut SpanWinners,
        state: ParseState<V>,
    ) -> Result<Option<StateId>, ParseError> {
        if !state.is_complete() || !self.complex.resolves(state.x()) {
            return Ok(chart.insert(column, state));
        }

        let span = (state.x(), state.origin());
        let incumbent = winners.best.get(&span).copied();
        if let Some(incumbent) = incumbent
            && !self.outranks(chart, column, &state, chart.state(incumbent))?
        {
            return Ok(None);
        }

        let Some(id) = chart.insert(column, state) else {
            return Ok(None);
        };
        if let Some(incumbent) = incumbent {
            if chart.state(incumbent).is_processed() {
                debug!(
                    column,
                    symbol = self.grammar.name(span.0),
                    origin = span.1,
                    "span winner replaced after use"
                );
            } else {
                winners.superseded.insert(incumbent);
            }
            trace!(column, origin = span.1, loser = incumbent.index(), winner = id.index(), "span collapsed");
        }
        winners.best.insert(span, id);
        Ok(Some(id))
    }

    /// Register a state that entered the column through a deferred shift.
    ///
    /// Returns whether it still has to be processed.
    pub(crate) fn admit<V>(
        &self,
        chart: &Chart<V>,
        column: usize,
        winners: &mut SpanWinners,
        id: StateId,
    ) -> Result<bool, ParseError> {
        let state = chart.state(id);
        if !state.is_complete() || !self.complex.resolves(state.x()) {
            return Ok(true);
        }

        let span = (state.x(), state.origin());
        if let Some(&incumbent) = winners.best.get(&span) {
            if !self.outranks(chart, column, state, chart.state(incumbent))? {
                winners.superseded.insert(id);
                return Ok(false);
            }
            winners.superseded.insert(incumbent);
        }
        winners.best.insert(span, id);
        Ok(true)
    }

    /// Resolve column `column` in place.
    ///
    /// The column becomes its uninteresting states, in their existing order,
    /// followed by one winner per group, in order of each group's first
    /// member.
    ///
    /// # Errors
    ///
    /// [`ParseError::AssociativityConflict`] when two candidates disagree on
    /// the associativity of a shared precedence level.
    pub fn remove_ambiguity<V>(
        &self,
        chart: &mut Chart<V>,
        column: usize,
    ) -> Result<(), ParseError> {
        let mut kept = Vec::new();
        let mut groups: Vec<(GroupKey, Vec<StateId>)> = Vec::new();
        let mut by_key: HashMap<GroupKey, usize> = HashMap::new();

        for (id, state) in chart.states(column) {
            if !self.has_ambiguity(state) {
                kept.push(id);
                continue;
            }
            let key = GroupKey {
                rule: state.rule(),
                origin: state.origin(),
                matched: state.ab().len(),
            };
            let slot = *by_key.entry(key).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(id);
        }

        for (key, members) in &groups {
            let Some((&first, rest)) = members.split_first() else {
                continue;
            };
            let winner = self.apply_ranking(chart, column, first, rest)?;
            if members.len() > 1 {
                debug!(
                    column,
                    rule = %self.grammar.describe_rule(key.rule),
                    origin = key.origin,
                    candidates = members.len(),
                    winner = winner.index(),
                    "collapsed competing derivations"
                );
            }
            kept.push(winner);
        }

        chart.set(column, kept);
        Ok(())
    }

    /// Pick the best ranked member of a group, keeping the first seen on ties
    fn apply_ranking<V>(
        &self,
        chart: &Chart<V>,
        column: usize,
        first: StateId,
        rest: &[StateId],
    ) -> Result<StateId, ParseError> {
        let mut winner = first;
        for &candidate in rest {
            if self.outranks(chart, column, chart.state(candidate), chart.state(winner))? {
                winner = candidate;
            }
        }
        Ok(winner)
    }

    fn outranks<V>(
        &self,
        chart: &Chart<V>,
        column: usize,
        candidate: &ParseState<V>,
        incumbent: &ParseState<V>,
    ) -> Result<bool, ParseError> {
        higher_rank(
            History::new(self.grammar, chart, candidate),
            History::new(self.grammar, chart, incumbent),
        )
        .map_err(|conflict| {
            ParseError::associativity_conflict(
                column,
                conflict.precedence,
                conflict.first,
                conflict.second,
            )
        })
    }
}
