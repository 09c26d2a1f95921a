//! Host-owned semantic actions
//!
//! The parser never looks inside semantic values. It asks the host for the
//! value of each scanned token and, when a rule completes, hands the
//! children's values back together with the rule's [`ActionId`].

use crate::grammar::ActionId;
use crate::lexer::Token;
use std::fmt;

/// Action dispatch table for one grammar.
///
/// # Example
///
/// ```rust
/// use chartparse::grammar::{ActionId, Semantics};
/// use chartparse::lexer::Token;
///
/// struct Sum;
///
/// impl Semantics for Sum {
///     type Value = i64;
///
///     fn terminal(&self, token: &Token<i64>) -> i64 {
///         token.value().copied().unwrap_or_default()
///     }
///
///     fn reduce(&self, action: &ActionId, children: Vec<i64>) -> i64 {
///         match action.as_str() {
///             "add" => children[0] + children[2],
///             _ => children.into_iter().sum(),
///         }
///     }
/// }
/// ```
pub trait Semantics {
    /// Value carried in a state's container
    type Value: Clone + fmt::Debug;

    /// Value bound to a scanned token
    fn terminal(&self, token: &Token<Self::Value>) -> Self::Value;

    /// Combine the values of a completed rule's right-hand side, in order
    fn reduce(&self, action: &ActionId, children: Vec<Self::Value>) -> Self::Value;
}

impl<S: Semantics + ?Sized> Semantics for &S {
    type Value = S::Value;

    fn terminal(&self, token: &Token<Self::Value>) -> Self::Value {
        (**self).terminal(token)
    }

    fn reduce(&self, action: &ActionId, children: Vec<Self::Value>) -> Self::Value {
        (**self).reduce(action, children)
    }
}

/// Recognizer-only semantics: every container holds `()`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSemantics;

impl Semantics for NoSemantics {
    type Value = ();

    fn terminal(&self, _token: &Token<()>) {}

    fn reduce(&self, _action: &ActionId, _children: Vec<()>) {}
}
