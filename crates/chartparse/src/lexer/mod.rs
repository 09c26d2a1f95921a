//! # Lexer Module
//!
//! Tokens consumed by the chart parser.
//!
//! ## Overview
//!
//! Tokenization itself happens outside this crate. The host's lexer fills
//! [`Token`] values with a terminal type, an optional semantic value, the
//! offset and line of the token, and the name of the lexical rule that
//! produced it. The parser only reads the type (to scan) and hands the whole
//! token to [`Semantics::terminal`](crate::grammar::Semantics::terminal).
//!
//! ## Usage
//!
//! ```rust
//! use chartparse::lexer::Token;
//!
//! let token = Token::new("NUMBER").with_value(42).with_position(0);
//! assert_eq!(token.kind(), Ok("NUMBER"));
//! assert_eq!(token.value(), Some(&42));
//! assert!(token.line().is_err());
//! ```

mod token;

pub use token::Token;
