//! Recursive-descent parser producing an [`Expr`] tree.
//!
//! Binary operators are parsed with a Pratt loop driven by
//! [`BinaryOp::binding_power`](lectlang_core::BinaryOp::binding_power);
//! `let` forms, sequences and applications are handled by dedicated
//! descent functions in [`expr_parser`].

mod expr_parser;

use lectlang_core::{Expr, ParseError, ParseErrorKind};

use crate::lexer::{Lexer, Token, TokenKind};

/// Parser over a token stream.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
}

impl<'src> Parser<'src> {
    /// Create a parser for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
        }
    }

    /// Parse a complete program: one expression followed by end of input.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &'src str) -> Result<Expr, ParseError> {
        let mut parser = Parser::new(source);
        let expr = parser.parse_expr()?;
        let next = parser.peek()?;
        if next.kind != TokenKind::Eof {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                next.span,
                format!("unexpected {} after complete expression", describe(&next)),
            ));
        }
        tracing::debug!(kind = expr.kind_name(), "parsed expression");
        Ok(expr)
    }

    // =========================================
    // Token helpers
    // =========================================

    fn peek(&mut self) -> Result<Token<'src>, ParseError> {
        Ok(self.lexer.peek()?)
    }

    fn peek_nth(&mut self, n: usize) -> Result<Token<'src>, ParseError> {
        Ok(self.lexer.peek_nth(n)?)
    }

    fn advance(&mut self) -> Result<Token<'src>, ParseError> {
        Ok(self.lexer.next_token()?)
    }

    fn check(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        Ok(self.peek()?.kind == kind)
    }

    /// Consume the next token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> Result<Option<Token<'src>>, ParseError> {
        if self.check(kind)? {
            self.advance().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Consume a token of the given kind or fail.
    fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>, ParseError> {
        let token = self.peek()?;
        if token.kind == kind {
            return self.advance();
        }
        Err(self.unexpected(&token, kind.description(), ParseErrorKind::ExpectedToken))
    }

    fn unexpected(&self, found: &Token<'_>, expected: &str, kind: ParseErrorKind) -> ParseError {
        if found.kind == TokenKind::Eof {
            return ParseError::new(
                ParseErrorKind::UnexpectedEof,
                found.span,
                format!("expected {expected}, found end of input"),
            );
        }
        ParseError::new(
            kind,
            found.span,
            format!("expected {expected}, found {}", describe(found)),
        )
    }
}

fn describe(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::Identifier | TokenKind::Number => {
            format!("{} '{}'", token.kind.description(), token.lexeme)
        }
        kind => kind.description().to_string(),
    }
}
