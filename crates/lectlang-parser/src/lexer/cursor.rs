/// A cursor over source text that tracks position.
///
/// Provides character access with peek/advance semantics and keeps the
/// byte offset, line and column of the next character up to date.
pub struct Cursor<'src> {
    /// The source text being scanned.
    source: &'src str,
    /// Remaining source text (slice starting at current position).
    rest: &'src str,
    /// Current byte offset from start of source.
    offset: u32,
    /// Current line number (1-indexed).
    line: u32,
    /// Current column number (1-indexed, byte-based).
    column: u32,
}

impl<'src> Cursor<'src> {
    /// Create a new cursor at the start of the source.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Current byte offset from start of source.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Current line number (1-indexed).
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column number (1-indexed, byte-based).
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    /// Peek at the current character without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peek at the nth character ahead (0 = current).
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Check if the current character satisfies a predicate.
    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    /// Consume the current character, updating line/column tracking.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        let len = ch.len_utf8();
        self.rest = &self.rest[len..];
        self.offset += len as u32;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += len as u32;
        }
        Some(ch)
    }

    /// Consume if the current character matches.
    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate matches and return them.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while self.check(&f) {
            self.advance();
        }
        self.slice_from(start)
    }

    /// Get a slice of source from a starting offset to current position.
    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.offset as usize]
    }
}

/// Check if a character can start an identifier.
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cursor = Cursor::new("let");
        assert_eq!(cursor.peek(), Some('l'));
        assert_eq!(cursor.advance(), Some('l'));
        assert_eq!(cursor.peek(), Some('e'));
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.peek_nth(1), Some('t'));
        assert_eq!(cursor.peek_nth(2), None);
    }

    #[test]
    fn cursor_eat() {
        let mut cursor = Cursor::new("->");
        assert!(!cursor.eat('>'));
        assert!(cursor.eat('-'));
        assert!(cursor.eat('>'));
        assert!(cursor.is_eof());
    }

    #[test]
    fn cursor_eat_while_returns_slice() {
        let mut cursor = Cursor::new("123+x");
        assert_eq!(cursor.eat_while(|c| c.is_ascii_digit()), "123");
        assert_eq!(cursor.peek(), Some('+'));
    }

    #[test]
    fn cursor_tracks_lines_and_columns() {
        let mut cursor = Cursor::new("a\n b");
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 2));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 2));
    }

    #[test]
    fn cursor_utf8_columns_count_bytes() {
        let mut cursor = Cursor::new("é1");
        cursor.advance();
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.column(), 3);
    }

    #[test]
    fn ident_predicates() {
        assert!(is_ident_start('x'));
        assert!(is_ident_start('_'));
        assert!(!is_ident_start('1'));
        assert!(is_ident_continue('1'));
        assert!(!is_ident_continue('-'));
    }
}
