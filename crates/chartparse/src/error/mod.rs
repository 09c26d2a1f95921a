//! # Error Types
//!
//! Errors raised while building grammars and while parsing.
//!
//! ## Overview
//!
//! - [`GrammarError`]: a malformed grammar, precedence table, complex-point
//!   layout or parser configuration. Raised at construction time,
//!   before any parse begins.
//! - [`ParseError`]: a fatal condition met while parsing. A parse that simply
//!   finds no accepting derivation is *not* an error; it shows up as an empty
//!   set of final states.
//! - [`TokenError`]: a token accessor used before its field was populated.
//!
//! ## Usage
//!
//! ```rust
//! use chartparse::error::GrammarError;
//! use chartparse::grammar::GrammarBuilder;
//!
//! let err = GrammarBuilder::new().build().unwrap_err();
//! assert!(matches!(err, GrammarError::EmptyGrammar));
//! ```

use crate::grammar::Associativity;
use compact_str::CompactString;
use thiserror::Error;

/// Configuration errors for grammars, precedence tables and complex points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Grammar has no rules")]
    EmptyGrammar,

    #[error("Grammar has {count} rules, more than a rule id can address")]
    TooManyRules { count: usize },

    #[error("Rule {index} ({lhs}) has an empty right-hand side")]
    EmptyRule { index: usize, lhs: CompactString },

    #[error("Duplicate precedence setting: {symbol}")]
    DuplicatePrecedence { symbol: CompactString },

    #[error("Precedence tier {index} lists no symbols")]
    EmptyPrecedenceTier { index: usize },

    #[error("No precedence declared for symbol {symbol}")]
    UnknownPrecedenceSymbol { symbol: CompactString },

    #[error("Complex point refers to rule {rule}, but the grammar has {rules} rules")]
    ComplexPointRuleOutOfRange { rule: usize, rules: usize },

    #[error("Complex point {position} is out of range for rule {rule} (rhs length {len})")]
    ComplexPointPositionOutOfRange {
        rule: usize,
        position: usize,
        len: usize,
    },

    #[error(
        "Complex point {position} of rule {rule} is filed under {symbol}, but the rule has {found} there"
    )]
    ComplexPointSymbolMismatch {
        symbol: CompactString,
        rule: usize,
        position: usize,
        found: CompactString,
    },

    #[error("Unknown grammar symbol: {symbol}")]
    UnknownSymbol { symbol: CompactString },

    #[error("Invalid debug level {0}, expected 0, 1 or 2")]
    InvalidDebugLevel(u8),
}

/// Fatal errors raised while parsing.
///
/// Every variant aborts the parse; the parser keeps no partial chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(
        "Associativity conflict in column {column}: precedence level {precedence} is declared \
         both {first:?} and {second:?}"
    )]
    AssociativityConflict {
        column: usize,
        precedence: u32,
        first: Associativity,
        second: Associativity,
    },

    #[error("Column {column} needs more states than a state id can address")]
    StateLimit { column: usize },

    #[error("Token {index} cannot be scanned")]
    InvalidToken {
        index: usize,
        #[source]
        source: TokenError,
    },
}

impl ParseError {
    /// Create an associativity conflict error
    #[must_use]
    pub const fn associativity_conflict(
        column: usize,
        precedence: u32,
        first: Associativity,
        second: Associativity,
    ) -> Self {
        Self::AssociativityConflict {
            column,
            precedence,
            first,
            second,
        }
    }
}

/// Errors raised by [`Token`](crate::lexer::Token) accessors and setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token field `{field}` was read before it was set")]
    InvalidState { field: &'static str },

    #[error("Token field `{field}` must not be empty")]
    EmptyField { field: &'static str },
}
