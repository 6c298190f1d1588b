//! Main lexer implementation.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s,
//! dispatching on the first character of each token. Lexing stops at the
//! first error.

use std::collections::VecDeque;

use lectlang_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for lecture language source code.
///
/// Provides lookahead via [`peek`](Self::peek) and
/// [`peek_nth`](Self::peek_nth).
pub struct Lexer<'src> {
    /// Low-level character cursor.
    cursor: Cursor<'src>,
    /// Lookahead buffer for peeking.
    lookahead: VecDeque<Token<'src>>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            lookahead: VecDeque::with_capacity(2),
        }
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        if let Some(token) = self.lookahead.pop_front() {
            return Ok(token);
        }
        self.scan_token()
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Token<'src>, LexError> {
        self.peek_nth(0)
    }

    /// Peek at the nth token ahead (0 = next).
    pub fn peek_nth(&mut self, n: usize) -> Result<Token<'src>, LexError> {
        while self.lookahead.len() <= n {
            let token = self.scan_token()?;
            self.lookahead.push_back(token);
        }
        Ok(self.lookahead[n])
    }

    /// Tokenize the whole input, including the trailing `Eof`.
    pub fn tokenize(source: &'src str) -> Result<Vec<Token<'src>>, LexError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Result<Token<'src>, LexError> {
        self.skip_trivia();

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        let Some(c) = self.cursor.peek() else {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                Span::point(start_line, start_col),
            ));
        };

        let kind = match c {
            c if c.is_ascii_digit() => return self.scan_number(start_line, start_col, start_offset),
            c if is_ident_start(c) => {
                let lexeme = self.cursor.eat_while(is_ident_continue);
                lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier)
            }
            _ => self.scan_operator(c, Span::new(start_line, start_col, c.len_utf8() as u32))?,
        };

        Ok(self.make_token(kind, start_line, start_col, start_offset))
    }

    /// Skip whitespace and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(char::is_whitespace);
            if self.cursor.peek() == Some('/') && self.cursor.peek_nth(1) == Some('/') {
                self.cursor.eat_while(|c| c != '\n');
            } else {
                return;
            }
        }
    }

    fn make_token(
        &self,
        kind: TokenKind,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'src> {
        let lexeme = self.cursor.slice_from(start_offset);
        let span = Span::new(start_line, start_col, lexeme.len() as u32);
        Token::new(kind, lexeme, span)
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    fn scan_number(
        &mut self,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Result<Token<'src>, LexError> {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let token = self.make_token(TokenKind::Number, start_line, start_col, start_offset);

        if self.cursor.check(is_ident_start) {
            return Err(LexError::InvalidNumber {
                span: token.span,
                detail: "identifier characters directly after a number".to_string(),
            });
        }
        if token.lexeme.parse::<i32>().is_err() {
            return Err(LexError::InvalidNumber {
                span: token.span,
                detail: format!("'{}' does not fit in a 32-bit integer", token.lexeme),
            });
        }
        Ok(token)
    }

    // =========================================
    // Scanning: Operators and punctuation
    // =========================================

    fn scan_operator(&mut self, c: char, span: Span) -> Result<TokenKind, LexError> {
        self.cursor.advance();
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' if self.cursor.eat('>') => TokenKind::Arrow,
            '-' => TokenKind::Minus,
            '=' if self.cursor.eat('=') => TokenKind::EqualEqual,
            '=' => TokenKind::Equal,
            '<' => TokenKind::Less,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ch => return Err(LexError::UnexpectedChar { ch, span }),
        };
        Ok(kind)
    }
}
