//! Token types for the lecture language lexer.

use lectlang_core::Span;
use std::fmt;

/// A token from the source code.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'src> {
    /// The type of token.
    pub kind: TokenKind,
    /// The source text of this token.
    pub lexeme: &'src str,
    /// Location in source.
    pub span: Span,
}

impl<'src> Token<'src> {
    /// Create a new token.
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'src str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// Integer literal: `42`
    Number,
    /// `true`
    True,
    /// `false`
    False,

    // =========================================
    // Keywords
    // =========================================
    /// `let`
    Let,
    /// `in`
    In,
    /// `num`
    Num,
    /// `bool`
    Bool,

    /// Identifier: `x`, `fib_2`
    Identifier,

    // =========================================
    // Operators
    // =========================================
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `==`
    EqualEqual,
    /// `<`
    Less,
    /// `=`
    Equal,
    /// `:`
    Colon,
    /// `->`
    Arrow,

    // =========================================
    // Delimiters
    // =========================================
    /// `,`
    Comma,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Whether this token can begin an atom (and thus an application argument).
    pub fn starts_atom(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Identifier
                | TokenKind::LeftParen
        )
    }

    /// Human-readable description for error messages.
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Let => "'let'",
            TokenKind::In => "'in'",
            TokenKind::Num => "'num'",
            TokenKind::Bool => "'bool'",
            TokenKind::Identifier => "identifier",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::EqualEqual => "'=='",
            TokenKind::Less => "'<'",
            TokenKind::Equal => "'='",
            TokenKind::Colon => "':'",
            TokenKind::Arrow => "'->'",
            TokenKind::Comma => "','",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Look up a keyword by its spelling.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "let" => Some(TokenKind::Let),
        "in" => Some(TokenKind::In),
        "num" => Some(TokenKind::Num),
        "bool" => Some(TokenKind::Bool),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        _ => None,
    }
}
