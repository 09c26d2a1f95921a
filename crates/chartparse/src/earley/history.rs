//! History vectors read out of the derivation DAG
//!
//! A state's history is the concatenation, in `ab` order, of one shift entry
//! per bound token and the history of every bound sub-derivation, closed by
//! the state's own reduction rank when it completes a self-referential rule.
//! Sub-derivations are shared between states, so the history is walked on
//! demand with an explicit stack instead of being copied into each state.

use crate::earley::chart::Chart;
use crate::earley::state::{Matched, ParseState, Rank};
use crate::grammar::Grammar;

/// Iterator over the [`Rank`] entries of one derivation, in input order
pub struct History<'a, V> {
    grammar: &'a Grammar,
    chart: &'a Chart<V>,
    /// states being walked, with the next `ab` position of each
    stack: Vec<(&'a ParseState<V>, usize)>,
}

impl<'a, V> History<'a, V> {
    /// Walk the history of `state`, whose sub-derivations live in `chart`.
    ///
    /// `state` itself does not have to be in the chart yet.
    #[must_use]
    pub fn new(grammar: &'a Grammar, chart: &'a Chart<V>, state: &'a ParseState<V>) -> Self {
        Self {
            grammar,
            chart,
            stack: vec![(state, 0)],
        }
    }
}

impl<V> Iterator for History<'_, V> {
    type Item = Rank;

    fn next(&mut self) -> Option<Rank> {
        loop {
            let frame = self.stack.last_mut()?;
            let state = frame.0;
            let matched = state.ab().get(frame.1).copied();
            frame.1 += 1;

            match matched {
                Some(Matched::Token { symbol, .. }) => {
                    return Some(Rank::shift(self.grammar.token_precedence(symbol)));
                }
                Some(Matched::Node { state: child, .. }) => {
                    let child = self.chart.state(child);
                    self.stack.push((child, 0));
                }
                None => {
                    self.stack.pop();
                    if let Some(rank) = state.rank() {
                        return Some(rank);
                    }
                }
            }
        }
    }
}
