//! Expression parsing.
//!
//! Precedence, loosest first: sequence, `let`, comparison, additive,
//! application. A `let` extends as far right as possible, so it may appear
//! unparenthesised only as the right-most operand.

use lectlang_core::{BinaryOp, Expr, ParseError, ParseErrorKind, Type};

use super::Parser;
use crate::lexer::TokenKind;

/// Map an operator token to its binary operator.
fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::EqualEqual => Some(BinaryOp::Eq),
        TokenKind::Less => Some(BinaryOp::Lt),
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        _ => None,
    }
}

impl<'src> Parser<'src> {
    /// Parse a full expression, including sequences.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_let()?;
        if self.eat(TokenKind::Comma)?.is_none() {
            return Ok(first);
        }
        let second = self.parse_expr()?;
        let span = first.span.merge(second.span);
        Ok(Expr::sequence(first, second, span))
    }

    /// Parse a `let` form, or an operator expression.
    fn parse_let(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Let)? {
            self.parse_let_form()
        } else {
            self.parse_binary(0)
        }
    }

    /// `let x = e in body` or `let f x : t -> t = body in recipient`
    fn parse_let_form(&mut self) -> Result<Expr, ParseError> {
        let let_token = self.expect(TokenKind::Let)?;
        let name = self.expect_identifier()?;

        if self.check(TokenKind::Identifier)? {
            let param = self.advance()?;
            self.expect(TokenKind::Colon)?;
            let param_type = self.parse_type()?;
            self.expect(TokenKind::Arrow)?;
            let return_type = self.parse_type()?;
            self.expect(TokenKind::Equal)?;
            let body = self.parse_let()?;
            self.expect(TokenKind::In)?;
            let recipient = self.parse_let()?;

            tracing::trace!(function = name, param = param.lexeme, "parsed function definition");
            let span = let_token.span.merge(recipient.span);
            return Ok(Expr::let_rec(
                name,
                param.lexeme,
                param_type,
                return_type,
                body,
                recipient,
                span,
            ));
        }

        self.expect(TokenKind::Equal)?;
        let value = self.parse_let()?;
        self.expect(TokenKind::In)?;
        let body = self.parse_let()?;

        let span = let_token.span.merge(body.span);
        Ok(Expr::let_in(name, value, body, span))
    }

    /// Pratt loop over the binary operators.
    fn parse_binary(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_operand()?;

        loop {
            let Some(op) = binary_op(self.peek()?.kind) else {
                break;
            };
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }

            self.advance()?;
            let rhs = self.parse_binary(r_bp)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::binary(op, lhs, rhs, span);
        }

        Ok(lhs)
    }

    /// An operator operand: a trailing `let`, an application, or an atom.
    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek()?;
        if token.kind == TokenKind::Let {
            return self.parse_let_form();
        }
        if token.kind == TokenKind::Identifier && self.peek_nth(1)?.kind.starts_atom() {
            self.advance()?;
            let argument = self.parse_atom()?;
            let span = token.span.merge(argument.span);
            return Ok(Expr::application(token.lexeme, argument, span));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Number => {
                self.advance()?;
                let value = token.lexeme.parse::<i32>().map_err(|e| {
                    ParseError::new(ParseErrorKind::InvalidToken, token.span, e.to_string())
                })?;
                Ok(Expr::number(value, token.span))
            }
            TokenKind::True | TokenKind::False => {
                self.advance()?;
                Ok(Expr::boolean(token.kind == TokenKind::True, token.span))
            }
            TokenKind::Identifier => {
                self.advance()?;
                Ok(Expr::variable(token.lexeme, token.span))
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected(&token, "expression", ParseErrorKind::ExpectedExpression)),
        }
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let token = self.peek()?;
        let ty = match token.kind {
            TokenKind::Num => Type::Num,
            TokenKind::Bool => Type::Bool,
            _ => {
                return Err(self.unexpected(
                    &token,
                    "type 'num' or 'bool'",
                    ParseErrorKind::ExpectedType,
                ));
            }
        };
        self.advance()?;
        Ok(ty)
    }

    fn expect_identifier(&mut self) -> Result<&'src str, ParseError> {
        let token = self.peek()?;
        if token.kind != TokenKind::Identifier {
            return Err(self.unexpected(&token, "identifier", ParseErrorKind::ExpectedIdentifier));
        }
        self.advance()?;
        Ok(token.lexeme)
    }
}
