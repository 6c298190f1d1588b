//! Lexer and parser for the lecture language.
//!
//! Turns source text into an [`Expr`](lectlang_core::Expr) tree with a
//! [`Span`](lectlang_core::Span) on every node. Parsing stops at the first
//! error.
//!
//! # Example
//!
//! ```
//! use lectlang_parser::Parser;
//!
//! let expr = Parser::parse("let x = 1 in x + 1").unwrap();
//! assert_eq!(expr.kind_name(), "let");
//! ```

pub mod lexer;
mod parser;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use lectlang_core::{Expr, ParseError};

/// Parse source text into an expression tree.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    Parser::parse(source)
}
