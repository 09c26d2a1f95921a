//! The column loop
//!
//! Column `i` is driven to a fixed point with two worklists. Incomplete
//! states go first, in FIFO order. Completed states follow, widest span
//! (smallest origin) last, so every sub-derivation of a span has settled
//! before the span itself is completed into its callers. Prediction and
//! completion insert straight into column `i`, where completed derivations
//! of an ambiguous symbol compete per span. Scan successors are parked on
//! their base state. Once the column is stable, ambiguity resolution prunes
//! it and only then are the parked successors of the survivors moved into
//! column `i + 1`.

use crate::earley::chart::Chart;
use crate::earley::config::{DebugLevel, ParserConfig};
use crate::earley::disambiguation::{AmbiguityResolver, SpanWinners};
use crate::earley::render::render_chart;
use crate::earley::state::{ParseState, StateId};
use crate::error::ParseError;
use crate::grammar::{ComplexPointTable, Grammar, Semantics};
use crate::intern::Symbol;
use crate::lexer::Token;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use tracing::{debug, trace};

/// Everything a parse reads but never changes
pub(crate) struct ParseContext<'a, S: Semantics> {
    pub grammar: &'a Grammar,
    pub complex: &'a ComplexPointTable,
    pub semantics: &'a S,
    pub config: &'a ParserConfig,
    pub tokens: &'a [Token<S::Value>],
}

/// Parse `ctx.tokens` into a fresh chart
pub(crate) fn parse<S: Semantics>(ctx: &ParseContext<'_, S>) -> Result<Chart<S::Value>, ParseError> {
    let kinds = token_kinds(ctx.grammar, ctx.tokens)?;
    let resolver = AmbiguityResolver::new(ctx.grammar, ctx.complex);

    let mut chart = Chart::new(ctx.tokens.len() + 1);
    chart.add(
        0,
        ParseState::initial(ctx.grammar, ctx.grammar.start(), 0),
    );

    for column in 0..chart.len() {
        process_column(ctx, &resolver, &kinds, &mut chart, column)?;
        resolver.remove_ambiguity(&mut chart, column)?;
        let shifted = do_shifts(&mut chart, column)?;

        trace!(
            column,
            states = chart.get(column).len(),
            shifted,
            "column complete"
        );
        if ctx.config.debug == DebugLevel::EveryColumn {
            debug!(column, chart = %render_chart(ctx.grammar, &chart), "chart");
        }
    }

    if ctx.config.debug == DebugLevel::Final {
        debug!(chart = %render_chart(ctx.grammar, &chart), "chart");
    }
    Ok(chart)
}

/// Interned terminal type of every token; `None` for types the grammar
/// never mentions
fn token_kinds<V>(grammar: &Grammar, tokens: &[Token<V>]) -> Result<Vec<Option<Symbol>>, ParseError> {
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            token
                .kind()
                .map(|kind| grammar.symbol(kind))
                .map_err(|source| ParseError::InvalidToken { index, source })
        })
        .collect()
}

/// Unprocessed states of the column being built
#[derive(Default)]
struct Worklist {
    incomplete: VecDeque<StateId>,
    /// keyed by origin, highest first, then by id, lowest first
    complete: BinaryHeap<(usize, Reverse<StateId>)>,
}

impl Worklist {
    fn push<V>(&mut self, chart: &Chart<V>, id: StateId) {
        let state = chart.state(id);
        if state.is_complete() {
            self.complete.push((state.origin(), Reverse(id)));
        } else {
            self.incomplete.push_back(id);
        }
    }

    fn pop(&mut self) -> Option<StateId> {
        self.incomplete
            .pop_front()
            .or_else(|| self.complete.pop().map(|(_, Reverse(id))| id))
    }
}

/// Drive column `column` to its fixed point
fn process_column<S: Semantics>(
    ctx: &ParseContext<'_, S>,
    resolver: &AmbiguityResolver<'_>,
    kinds: &[Option<Symbol>],
    chart: &mut Chart<S::Value>,
    column: usize,
) -> Result<(), ParseError> {
    let kind = kinds.get(column).copied().flatten();
    let mut winners = SpanWinners::default();
    let mut worklist = Worklist::default();

    for id in chart.get(column).to_vec() {
        if resolver.admit(chart, column, &mut winners, id)? {
            worklist.push(chart, id);
        }
    }

    while let Some(id) = worklist.pop() {
        if chart.state(id).is_processed() || winners.is_superseded(id) {
            continue;
        }
        chart.state_mut(id).mark_processed();

        let state = chart.state(id);
        let mut produced: Vec<ParseState<S::Value>> = state.closure(ctx.grammar, column).collect();
        produced.extend(state.reductions(id, chart));

        let successor = state.shift(kind, column).map(|mut successor| {
            successor.finalize(ctx.grammar, chart, ctx.tokens, ctx.semantics);
            successor
        });
        for next in &mut produced {
            next.finalize(ctx.grammar, chart, ctx.tokens, ctx.semantics);
        }

        if let Some(successor) = successor {
            chart.state_mut(id).defer_shift(successor);
        }
        for next in produced {
            if chart.is_full() {
                return Err(ParseError::StateLimit { column });
            }
            if let Some(new_id) = resolver.insert(chart, column, &mut winners, next)? {
                worklist.push(chart, new_id);
            }
        }
    }

    if winners.has_superseded() {
        let kept: Vec<StateId> = chart
            .get(column)
            .iter()
            .copied()
            .filter(|&id| !winners.is_superseded(id))
            .collect();
        chart.set(column, kept);
    }
    Ok(())
}

/// Move the parked scan successors of column `column`'s survivors into the
/// next column. Returns how many were inserted.
fn do_shifts<V>(chart: &mut Chart<V>, column: usize) -> Result<usize, ParseError> {
    if column + 1 >= chart.len() {
        return Ok(0);
    }
    let survivors = chart.get(column).to_vec();
    let mut shifted = 0;
    for id in survivors {
        let Some(successor) = chart.state_mut(id).take_shift() else {
            continue;
        };
        if chart.is_full() {
            return Err(ParseError::StateLimit { column: column + 1 });
        }
        if chart.add(column + 1, successor) {
            shifted += 1;
        }
    }
    Ok(shifted)
}
