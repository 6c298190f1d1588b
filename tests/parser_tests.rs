//! Source-level parser tests through the public API.

mod test_harness;

use lectlang::{ExprKind, ParseError, Span, parse};
use lectlang_core::ParseErrorKind;
use lectlang_parser::{Lexer, TokenKind};
use test_harness::TestHarness;

fn parse_err(source: &str) -> ParseError {
    parse(source).unwrap_err()
}

#[test]
fn every_script_parses() {
    for script in TestHarness::new().load_all() {
        if let Err(e) = parse(&script.source) {
            panic!("{} failed to parse: {e}", script.name);
        }
    }
}

#[test]
fn spans_follow_lines_and_columns() {
    let expr = parse("// header\nlet x = 1 in\n  x + 1").unwrap();
    assert_eq!((expr.span.line, expr.span.col), (2, 1));
    let ExprKind::Let(let_expr) = &expr.kind else {
        panic!("expected let");
    };
    assert_eq!((let_expr.body.span.line, let_expr.body.span.col), (3, 3));
}

#[test]
fn comments_run_to_end_of_line() {
    let expr = parse("1 + // ignored 99\n2").unwrap();
    assert_eq!(expr.kind_name(), "binary operation");
}

#[test]
fn keywords_and_operators_tokenize() {
    let kinds: Vec<_> = Lexer::tokenize("let f x : num -> bool = x == 1 in f 2")
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect();
    assert_eq!(
        kinds,
        [
            TokenKind::Let,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Num,
            TokenKind::Arrow,
            TokenKind::Bool,
            TokenKind::Equal,
            TokenKind::Identifier,
            TokenKind::EqualEqual,
            TokenKind::Number,
            TokenKind::In,
            TokenKind::Identifier,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn number_overflow_is_a_lexical_error() {
    let err = parse_err("2147483648");
    assert_eq!(err.kind, ParseErrorKind::InvalidToken);
    assert_eq!(err.span.line, 1);
}

#[test]
fn unknown_character_is_reported_where_it_appears() {
    let err = parse_err("1 +\n  $");
    assert_eq!(err.kind, ParseErrorKind::InvalidToken);
    assert_eq!((err.span.line, err.span.col), (2, 3));
}

#[test]
fn incomplete_input() {
    assert_eq!(parse_err("let x = 1 in").kind, ParseErrorKind::UnexpectedEof);
    assert_eq!(parse_err("(1 + 2").kind, ParseErrorKind::UnexpectedEof);
}

#[test]
fn trailing_input_is_rejected() {
    let err = parse_err("1 2");
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    assert_eq!(err.span, Span::new(1, 3, 1));
}

#[test]
fn missing_type_annotation() {
    assert_eq!(
        parse_err("let f x : int -> num = x in f 1").kind,
        ParseErrorKind::ExpectedType
    );
}
