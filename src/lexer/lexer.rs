use tracing::debug;

use crate::{
    errors::{
        errors::{Error, ErrorImpl},
        handler::ErrorHandler,
    },
    Position, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP, TYPE_LOOKUP};

/// Hand-written single pass scanner.
///
/// `start` marks the first character of the token being scanned and `current`
/// the next character to consume. Columns are measured from `line_start`, the
/// index of the first character on the current line.
#[derive(Clone)]
pub struct Lexer {
    tokens: Vec<Token>,
    source: Vec<char>,
    start: usize,
    current: usize,
    line: u32,
    line_start: usize,
    token_line: u32,
    token_column: u32,
}

impl Lexer {
    pub fn new(source: &str) -> Lexer {
        Lexer {
            tokens: vec![],
            source: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
            token_line: 1,
            token_column: 0,
        }
    }

    /// Scans the whole source. Bad characters and unterminated strings are
    /// reported to `handler` and skipped, so this always returns a token list
    /// ending in exactly one EOF token.
    pub fn scan_tokens(mut self, handler: &mut ErrorHandler) -> Vec<Token> {
        while !self.at_eof() {
            self.start = self.current;
            self.token_line = self.line;
            self.token_column = (self.start - self.line_start) as u32;
            self.scan_token(handler);
        }

        let eof_position = Position::new(self.line, (self.current - self.line_start) as u32);
        self.push(MK_TOKEN!(TokenKind::EOF, String::new(), None, eof_position));

        debug!("scanned {} tokens", self.tokens.len());
        self.tokens
    }

    fn scan_token(&mut self, handler: &mut ErrorHandler) {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenKind::OpenParen),
            ')' => self.add_token(TokenKind::CloseParen),
            '{' => self.add_token(TokenKind::OpenCurly),
            '}' => self.add_token(TokenKind::CloseCurly),
            '[' => self.add_token(TokenKind::OpenBracket),
            ']' => self.add_token(TokenKind::CloseBracket),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            ';' => self.add_token(TokenKind::Semicolon),
            ':' => self.add_token(TokenKind::Colon),
            '+' => self.add_token(TokenKind::Plus),
            '-' => self.add_token(TokenKind::Dash),
            '*' => self.add_token(TokenKind::Star),
            '\\' => self.add_token(TokenKind::BackSlash),
            '|' => self.add_token(TokenKind::Pipe),
            '&' => self.add_token(TokenKind::Ampersand),
            '^' => self.add_token(TokenKind::Caret),
            '!' => {
                let kind = if self.match_next('=') {
                    TokenKind::NotEquals
                } else {
                    TokenKind::Not
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.match_next('=') {
                    TokenKind::Equals
                } else {
                    TokenKind::Assignment
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_next('=') {
                    TokenKind::LessEquals
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.match_next('=') {
                    TokenKind::GreaterEquals
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            '/' => {
                if self.match_next('/') {
                    // Line comment, runs to the end of the line.
                    while self.peek() != '\n' && !self.at_eof() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.next_line(),
            '"' => self.string(handler),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
            c => handler.report(&Error::new(
                ErrorImpl::UnexpectedCharacter { character: c },
                self.token_position(),
            )),
        }
    }

    fn string(&mut self, handler: &mut ErrorHandler) {
        while self.peek() != '"' && !self.at_eof() {
            let c = self.advance();
            if c == '\\' && !self.at_eof() {
                // Keep the escaped character out of the terminator check.
                if self.advance() == '\n' {
                    self.next_line();
                }
            } else if c == '\n' {
                self.next_line();
            }
        }

        if self.at_eof() {
            handler.report(&Error::new(
                ErrorImpl::UnterminatedString,
                self.token_position(),
            ));
            return;
        }

        // The closing quote.
        self.advance();

        let contents: String = self.source[(self.start + 1)..(self.current - 1)]
            .iter()
            .collect();
        self.add_literal_token(TokenKind::String, unescape(&contents));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A trailing '.' without digits after it is not part of the number.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.current_lexeme();
        self.add_literal_token(TokenKind::Number, text);
    }

    fn identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = self.current_lexeme();
        let kind = RESERVED_LOOKUP
            .get(text.as_str())
            .or_else(|| TYPE_LOOKUP.get(text.as_str()))
            .copied()
            .unwrap_or(TokenKind::Identifier);

        self.add_token(kind);
    }

    fn next_line(&mut self) {
        self.line += 1;
        self.line_start = self.current;
    }

    fn token_position(&self) -> Position {
        Position::new(self.token_line, self.token_column)
    }

    fn current_lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.current_lexeme();
        let position = self.token_position();
        self.push(MK_TOKEN!(kind, lexeme, None, position));
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal: String) {
        let lexeme = self.current_lexeme();
        let position = self.token_position();
        self.push(MK_TOKEN!(kind, lexeme, Some(literal), position));
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn advance(&mut self) -> char {
        let c = self.at();
        self.current += 1;
        c
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.at_eof() || self.at() != expected {
            return false;
        }

        self.current += 1;
        true
    }

    pub fn at(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek(&self) -> char {
        self.at()
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    pub fn at_eof(&self) -> bool {
        self.current >= self.source.len()
    }
}

fn unescape(contents: &str) -> String {
    let mut result = String::new();
    let mut chars = contents.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('0') => result.push('\0'),
            Some(other) => {
                result.push('\\');
                result.push(*other);
            }
            None => {
                result.push('\\');
                continue;
            }
        }
        chars.next();
    }

    result
}

/// Scans `source` into tokens, reporting lexical errors to `handler`.
pub fn scan_tokens(source: &str, handler: &mut ErrorHandler) -> Vec<Token> {
    Lexer::new(source).scan_tokens(handler)
}
