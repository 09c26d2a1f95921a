//! Derivation trees
//!
//! A completed state references the states it was completed from, so every
//! accepting state roots a derivation DAG inside the chart. [`Derivation`]
//! is the owned tree view of one such root.

use crate::earley::chart::Chart;
use crate::earley::state::{Matched, ParseState, StateId};
use crate::grammar::{Grammar, RuleId};
use compact_str::CompactString;
use std::fmt;

/// Owned derivation tree.
///
/// Building, walking, comparing and dropping a tree use explicit stacks, so
/// the depth of a derivation is bounded by memory and not by the call stack.
#[derive(Debug, Clone)]
pub enum Derivation {
    /// A terminal bound to the token at `index`
    Token { symbol: CompactString, index: usize },
    /// A completed rule
    Node {
        rule: RuleId,
        symbol: CompactString,
        children: Vec<Derivation>,
    },
}

/// A completed state whose children are being collected
struct Frame<'c, V> {
    state: &'c ParseState<V>,
    next: usize,
    children: Vec<Derivation>,
}

impl<'c, V> Frame<'c, V> {
    fn new(state: &'c ParseState<V>) -> Option<Self> {
        state.is_complete().then(|| Self {
            state,
            next: 0,
            children: Vec::with_capacity(state.ab().len()),
        })
    }
}

impl Derivation {
    /// Build the tree rooted at `id`.
    ///
    /// Returns `None` if `id` is not a completed state of `chart`.
    #[must_use]
    pub fn build<V>(grammar: &Grammar, chart: &Chart<V>, id: StateId) -> Option<Self> {
        let mut stack = vec![Frame::new(chart.get_state(id)?)?];

        loop {
            let frame = stack.last_mut()?;
            let matched = frame.state.ab().get(frame.next).copied();
            frame.next += 1;

            match matched {
                Some(Matched::Token { symbol, index }) => frame.children.push(Self::Token {
                    symbol: grammar.name(symbol).into(),
                    index,
                }),
                Some(Matched::Node { state, .. }) => {
                    stack.push(Frame::new(chart.get_state(state)?)?);
                }
                None => {
                    let done = stack.pop()?;
                    let node = Self::Node {
                        rule: done.state.rule(),
                        symbol: grammar.name(done.state.x()).into(),
                        children: done.children,
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Some(node),
                    }
                }
            }
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        match self {
            Self::Token { symbol, .. } | Self::Node { symbol, .. } => symbol,
        }
    }

    /// Token indices covered by this tree, left to right
    #[must_use]
    pub fn leaves(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(tree) = pending.pop() {
            match tree {
                Self::Token { index, .. } => out.push(*index),
                Self::Node { children, .. } => pending.extend(children.iter().rev()),
            }
        }
        out
    }
}

impl PartialEq for Derivation {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (
                    Self::Token { symbol, index },
                    Self::Token {
                        symbol: other_symbol,
                        index: other_index,
                    },
                ) => {
                    if symbol != other_symbol || index != other_index {
                        return false;
                    }
                }
                (
                    Self::Node {
                        rule,
                        symbol,
                        children,
                    },
                    Self::Node {
                        rule: other_rule,
                        symbol: other_symbol,
                        children: other_children,
                    },
                ) => {
                    if rule != other_rule
                        || symbol != other_symbol
                        || children.len() != other_children.len()
                    {
                        return false;
                    }
                    pending.extend(children.iter().zip(other_children));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Derivation {}

impl Drop for Derivation {
    fn drop(&mut self) {
        let Self::Node { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut child) = pending.pop() {
            if let Self::Node { children, .. } = &mut child {
                pending.append(children);
            }
        }
    }
}

enum Piece<'a> {
    Tree(&'a Derivation),
    Text(&'static str),
}

/// Bracketed form: `exp[exp[NUMBER] + exp[NUMBER]]`
impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Tree(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Tree(Self::Token { symbol, .. }) => f.write_str(symbol)?,
                Piece::Tree(Self::Node {
                    symbol, children, ..
                }) => {
                    write!(f, "{symbol}[")?;
                    pending.push(Piece::Text("]"));
                    for (i, child) in children.iter().enumerate().rev() {
                        pending.push(Piece::Tree(child));
                        if i > 0 {
                            pending.push(Piece::Text(" "));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
