//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords, type names and identifiers
//! - Numeric and string literals
//! - One and two character operators
//! - Comments, newlines and column tracking
//! - Error cases

use super::{lexer::scan_tokens, tokens::TokenKind};
use crate::{errors::handler::ErrorHandler, Position};

fn kinds(source: &str) -> Vec<TokenKind> {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens(source, &mut handler);
    assert!(!handler.had_error(), "unexpected diagnostics: {:?}", handler.diagnostics());
    tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn test_tokenize_keywords() {
    assert_eq!(
        kinds("fn extern if else for var return binary unary in then void double"),
        vec![
            TokenKind::Fn,
            TokenKind::Extern,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::For,
            TokenKind::Var,
            TokenKind::Return,
            TokenKind::Binary,
            TokenKind::Unary,
            TokenKind::In,
            TokenKind::Then,
            TokenKind::Void,
            TokenKind::Double,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens("foo bar_1 print newLine _x", &mut handler);

    let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
    assert_eq!(lexemes, vec!["foo", "bar_1", "print", "newLine", "_x", ""]);
    assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::Identifier));
    assert!(tokens[..5].iter().all(|t| t.literal.is_none()));
}

#[test]
fn test_tokenize_function_definition() {
    assert_eq!(
        kinds("fn add(a,b) double { return a+b; }"),
        vec![
            TokenKind::Fn,
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Identifier,
            TokenKind::CloseParen,
            TokenKind::Double,
            TokenKind::OpenCurly,
            TokenKind::Return,
            TokenKind::Identifier,
            TokenKind::Plus,
            TokenKind::Identifier,
            TokenKind::Semicolon,
            TokenKind::CloseCurly,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_lexemes_reconstruct_source() {
    let source = "fn add(a,b) double { return a+b; }";
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens(source, &mut handler);

    let joined: String = tokens.iter().map(|t| t.lexeme.as_str()).collect();
    let stripped: String = source.chars().filter(|c| !c.is_whitespace()).collect();
    assert_eq!(joined, stripped);
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("( ) { } [ ] , . ; : + - * / \\ | & ^ ! != = == < <= > >="),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::Semicolon,
            TokenKind::Colon,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::BackSlash,
            TokenKind::Pipe,
            TokenKind::Ampersand,
            TokenKind::Caret,
            TokenKind::Not,
            TokenKind::NotEquals,
            TokenKind::Assignment,
            TokenKind::Equals,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_numbers() {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens("42 3.14 7.", &mut handler);

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].literal.as_deref(), Some("42"));
    assert_eq!(tokens[1].kind, TokenKind::Number);
    assert_eq!(tokens[1].literal.as_deref(), Some("3.14"));
    // A dot with no digits after it is not consumed by the number.
    assert_eq!(tokens[2].literal.as_deref(), Some("7"));
    assert_eq!(tokens[3].kind, TokenKind::Dot);
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_strings() {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens("\"hello world\" \"tab\\there\\n\"", &mut handler);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].lexeme, "\"hello world\"");
    assert_eq!(tokens[0].literal.as_deref(), Some("hello world"));
    assert_eq!(tokens[1].literal.as_deref(), Some("tab\there\n"));
    assert!(!handler.had_error());
}

#[test]
fn test_multiline_string_advances_line() {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens("\"a\nb\" x", &mut handler);

    assert_eq!(tokens[0].literal.as_deref(), Some("a\nb"));
    assert_eq!(tokens[0].position, Position::new(1, 0));
    assert_eq!(tokens[1].position, Position::new(2, 3));
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("// nothing here\nfoo // trailing\n/ bar"),
        vec![
            TokenKind::Identifier,
            TokenKind::Slash,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_positions() {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens("fn main() void {\n  newLine();\n}", &mut handler);

    assert_eq!(tokens[0].position, Position::new(1, 0));
    assert_eq!(tokens[1].position, Position::new(1, 3));
    assert_eq!(tokens[5].position, Position::new(1, 15));
    // First token of the second line is reported relative to that line.
    assert_eq!(tokens[6].lexeme, "newLine");
    assert_eq!(tokens[6].position, Position::new(2, 2));

    let eof = tokens.last().unwrap();
    assert_eq!(eof.kind, TokenKind::EOF);
    assert_eq!(eof.position, Position::new(3, 1));
}

#[test]
fn test_unexpected_character_is_reported_and_skipped() {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens("a $ b", &mut handler);

    assert!(handler.had_error());
    assert_eq!(handler.error_messages(), vec!["unexpected character: $"]);
    assert_eq!(handler.diagnostics()[0].position, Some(Position::new(1, 2)));

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::EOF]
    );
}

#[test]
fn test_unterminated_string() {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens("x \"never closed", &mut handler);

    assert_eq!(handler.error_messages(), vec!["unterminated string"]);
    assert_eq!(
        handler.diagnostics()[0].tip.as_deref(),
        Some("add a closing '\"' to the string literal")
    );
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].kind, TokenKind::EOF);
}

#[test]
fn test_empty_source_has_single_eof() {
    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens("", &mut handler);

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::EOF);
    assert_eq!(tokens[0].position, Position::new(1, 0));
}
