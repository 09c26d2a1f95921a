//! Human-readable chart dumps

use crate::earley::chart::Chart;
use crate::earley::state::ParseState;
use crate::grammar::Grammar;
use std::fmt::{self, Write};

/// Render one state as `lhs -> a b . c d from j (value)`
///
/// The value part is omitted while the state has no container.
pub fn render_state<V: fmt::Debug>(grammar: &Grammar, state: &ParseState<V>) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_state(&mut out, grammar, state);
    out
}

/// Render every column of `chart`
#[must_use]
pub fn render_chart<V: fmt::Debug>(grammar: &Grammar, chart: &Chart<V>) -> String {
    let mut out = String::new();
    for column in 0..chart.len() {
        let _ = writeln!(out, "== chart {column}");
        for (_, state) in chart.states(column) {
            out.push_str("    ");
            let _ = write_state(&mut out, grammar, state);
            out.push('\n');
        }
    }
    out
}

fn write_state<V: fmt::Debug>(
    out: &mut String,
    grammar: &Grammar,
    state: &ParseState<V>,
) -> fmt::Result {
    write!(out, "{} ->", grammar.name(state.x()))?;
    for matched in state.ab() {
        write!(out, " {}", grammar.name(matched.symbol()))?;
    }
    out.push_str(" .");
    for &symbol in state.cd() {
        write!(out, " {}", grammar.name(symbol))?;
    }
    write!(out, " from {}", state.origin())?;
    if let Some(value) = state.container() {
        write!(out, " ({value:?})")?;
    }
    Ok(())
}
