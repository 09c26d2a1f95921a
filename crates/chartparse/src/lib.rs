//! # Chartparse
//!
//! An Earley-style chart parser for arbitrary context-free grammars, with a
//! deterministic ambiguity-resolution layer driven by operator precedence
//! and associativity.
//!
//! ## Overview
//!
//! - **Any context-free grammar**: left recursion and ambiguous rules such as
//!   `exp -> exp '+' exp` are accepted as written
//! - **Precedence and associativity**: competing derivations are collapsed
//!   while parsing, at "complex points" computed from the grammar
//! - **Host-owned semantics**: rules carry an opaque action id; the host
//!   folds values through the [`Semantics`](grammar::Semantics) trait
//! - **Grammar as data**: [`GrammarDefinition`](grammar::GrammarDefinition)
//!   can be built in code or (with the `serialize` feature) loaded from JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use chartparse::earley::ChartParser;
//! use chartparse::grammar::{ActionId, Associativity, ComplexPointTable, GrammarBuilder, Semantics};
//! use chartparse::lexer::Token;
//!
//! // 1. Host semantics: evaluate the expression while parsing
//! struct Calculator;
//!
//! impl Semantics for Calculator {
//!     type Value = i64;
//!
//!     fn terminal(&self, token: &Token<i64>) -> i64 {
//!         token.value().copied().unwrap_or_default()
//!     }
//!
//!     fn reduce(&self, action: &ActionId, children: Vec<i64>) -> i64 {
//!         match action.as_str() {
//!             "add" => children[0] + children[2],
//!             "mul" => children[0] * children[2],
//!             _ => children[0],
//!         }
//!     }
//! }
//!
//! // 2. Grammar, loosest-binding precedence tier first
//! let grammar = GrammarBuilder::new()
//!     .precedence(Associativity::Left, ["+"])
//!     .precedence(Associativity::Left, ["*"])
//!     .rule("start", ["exp"], "start")
//!     .rule("exp", ["exp", "+", "exp"], "add")
//!     .rule("exp", ["exp", "*", "exp"], "mul")
//!     .rule("exp", ["NUMBER"], "num")
//!     .build()?;
//! let complex = ComplexPointTable::for_grammar(&grammar);
//!
//! // 3. Tokens come from the host's lexer
//! let tokens = vec![
//!     Token::new("NUMBER").with_value(2),
//!     Token::new("+"),
//!     Token::new("NUMBER").with_value(3),
//!     Token::new("*"),
//!     Token::new("NUMBER").with_value(4),
//! ];
//!
//! // 4. Parse and read the surviving derivation's value
//! let mut parser = ChartParser::new(&grammar, &complex, Calculator);
//! parser.parse(tokens)?;
//! assert_eq!(parser.results(), vec![&14]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] - Rules, precedence tiers, complex points and semantics
//! - [`lexer`] - The token type handed to the parser
//! - [`earley`] - Chart, parse states, ambiguity resolution and the parser
//! - [`intern`] - Symbol interning
//! - [`error`] - Error types
//! - [`testing`] - Random sentence generation for tests and fuzzing

pub mod earley;
pub mod error;
pub mod grammar;
pub mod intern;
pub mod lexer;
pub mod testing;

pub use earley::{ChartParser, DebugLevel, Derivation, ParserConfig, StateId};
pub use error::{GrammarError, ParseError, TokenError};
pub use grammar::{
    ActionId, Associativity, ComplexPointTable, ComplexPoints, Grammar, GrammarBuilder,
    GrammarDefinition, NoSemantics, Semantics,
};
pub use lexer::Token;
