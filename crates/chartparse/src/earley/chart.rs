//! Chart data structure
//!
//! All states of a parse live in one arena owned by the [`Chart`] and are
//! addressed by [`StateId`]. Columns only hold ids, so a state dropped from
//! a column by ambiguity resolution stays reachable from the states that
//! were already completed from it.

use crate::earley::state::{ParseState, StateId, StateKey};
use crate::intern::Symbol;
use hashbrown::HashMap;
use smallvec::SmallVec;

/// Ids of one input position, with the lookups the parser needs
#[derive(Debug, Clone, Default)]
struct Column {
    ids: Vec<StateId>,
    /// structural key -> id, for idempotent insertion
    index: HashMap<StateKey, StateId>,
    /// next expected symbol -> ids, for completion
    waiting: HashMap<Symbol, SmallVec<[StateId; 4]>>,
}

impl Column {
    fn push<V>(&mut self, id: StateId, state: &ParseState<V>) -> bool {
        let key = state.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, id);
        if let Some(symbol) = state.next_symbol() {
            self.waiting.entry(symbol).or_default().push(id);
        }
        self.ids.push(id);
        true
    }

    fn clear(&mut self) {
        self.ids.clear();
        self.index.clear();
        self.waiting.clear();
    }
}

/// One column of states per input position (token count + 1)
#[derive(Debug, Clone)]
pub struct Chart<V> {
    states: Vec<ParseState<V>>,
    columns: Vec<Column>,
}

impl<V> Chart<V> {
    /// Create a chart with `size` empty columns
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            states: Vec::new(),
            columns: vec![Column::default(); size],
        }
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Ids of the states in column `column`, in insertion order.
    ///
    /// Out-of-range columns are empty.
    #[must_use]
    pub fn get(&self, column: usize) -> &[StateId] {
        self.columns
            .get(column)
            .map_or(&[], |column| column.ids.as_slice())
    }

    /// Ids of the final column
    #[must_use]
    pub fn last(&self) -> &[StateId] {
        self.columns
            .last()
            .map_or(&[], |column| column.ids.as_slice())
    }

    /// States of column `column` paired with their ids
    pub fn states(&self, column: usize) -> impl Iterator<Item = (StateId, &ParseState<V>)> {
        self.get(column).iter().map(|&id| (id, self.state(id)))
    }

    /// Look up a state by id
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this chart.
    #[must_use]
    pub fn state(&self, id: StateId) -> &ParseState<V> {
        &self.states[id.index()]
    }

    #[must_use]
    pub fn get_state(&self, id: StateId) -> Option<&ParseState<V>> {
        self.states.get(id.index())
    }

    pub(crate) fn state_mut(&mut self, id: StateId) -> &mut ParseState<V> {
        &mut self.states[id.index()]
    }

    /// Total number of states ever inserted, including resolved-away ones
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Ids in column `column` whose next expected symbol is `symbol`
    #[must_use]
    pub fn waiting(&self, column: usize, symbol: Symbol) -> &[StateId] {
        self.columns
            .get(column)
            .and_then(|column| column.waiting.get(&symbol))
            .map_or(&[], |ids| ids.as_slice())
    }

    /// Whether column `column` holds a state structurally equal to `state`
    #[must_use]
    pub fn contains(&self, column: usize, state: &ParseState<V>) -> bool {
        self.columns
            .get(column)
            .is_some_and(|column| column.index.contains_key(&state.key()))
    }

    /// Whether the arena has run out of state ids
    #[must_use]
    pub fn is_full(&self) -> bool {
        StateId::from_index(self.states.len()).is_none()
    }

    /// Insert `state` into column `column` unless a structurally equal state
    /// is already there. Returns the new id.
    ///
    /// Nothing is inserted once the chart [is full](Chart::is_full).
    pub fn insert(&mut self, column: usize, state: ParseState<V>) -> Option<StateId> {
        let target = self.columns.get_mut(column)?;
        let id = StateId::from_index(self.states.len())?;
        if !target.push(id, &state) {
            return None;
        }
        self.states.push(state);
        Some(id)
    }

    /// Insert `state` into column `column`; returns whether anything changed
    pub fn add(&mut self, column: usize, state: ParseState<V>) -> bool {
        self.insert(column, state).is_some()
    }

    /// Replace column `column` wholesale with the given states.
    ///
    /// Ids must come from this chart. Duplicates are dropped.
    pub fn set(&mut self, column: usize, ids: impl IntoIterator<Item = StateId>) {
        let Some(target) = self.columns.get_mut(column) else {
            return;
        };
        target.clear();
        for id in ids {
            if let Some(state) = self.states.get(id.index()) {
                target.push(id, state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, GrammarBuilder, RuleId};

    fn grammar() -> Grammar {
        GrammarBuilder::new()
            .rule("start", ["exp"], "start")
            .rule("exp", ["exp", "+", "exp"], "add")
            .rule("exp", ["NUMBER"], "num")
            .build()
            .expect("valid grammar")
    }

    #[test]
    fn test_add_is_idempotent() {
        let grammar = grammar();
        let mut chart = Chart::<()>::new(2);

        assert!(chart.add(0, ParseState::initial(&grammar, grammar.start(), 0)));
        assert!(!chart.add(0, ParseState::initial(&grammar, grammar.start(), 0)));
        assert_eq!(chart.get(0).len(), 1);
        assert_eq!(chart.state_count(), 1);
        assert!(!chart.is_full());

        // same item, different origin
        assert!(chart.add(0, ParseState::initial(&grammar, grammar.start(), 1)));
    }

    #[test]
    fn test_out_of_range_columns_are_empty() {
        let grammar = grammar();
        let mut chart = Chart::<()>::new(1);

        assert!(chart.get(5).is_empty());
        assert!(chart.get(usize::MAX).is_empty());
        assert!(!chart.add(3, ParseState::initial(&grammar, grammar.start(), 0)));
    }

    #[test]
    fn test_set_rebuilds_lookups() {
        let grammar = grammar();
        let exp = grammar.symbol("exp").expect("interned");
        let mut chart = Chart::<()>::new(2);

        let start = chart
            .insert(0, ParseState::initial(&grammar, grammar.start(), 0))
            .expect("new state");
        let add = chart
            .insert(0, ParseState::initial(&grammar, RuleId::from_index(1), 0))
            .expect("new state");
        assert_eq!(chart.waiting(0, exp), &[start, add]);

        chart.set(0, [add]);
        assert_eq!(chart.get(0), &[add]);
        assert_eq!(chart.waiting(0, exp), &[add]);
        assert!(!chart.contains(0, chart.state(start)));

        // the arena keeps the dropped state
        assert_eq!(chart.state(start).rule(), grammar.start());
        assert!(chart.add(0, ParseState::initial(&grammar, grammar.start(), 0)));
    }

    #[test]
    fn test_last() {
        let grammar = grammar();
        let mut chart = Chart::<()>::new(3);
        let id = chart
            .insert(2, ParseState::initial(&grammar, grammar.start(), 2))
            .expect("new state");
        assert_eq!(chart.last(), &[id]);
        assert_eq!(chart.len(), 3);
    }
}
