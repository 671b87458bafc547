use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Position;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("fn", TokenKind::Fn);
        map.insert("extern", TokenKind::Extern);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("for", TokenKind::For);
        map.insert("var", TokenKind::Var);
        map.insert("return", TokenKind::Return);
        map.insert("binary", TokenKind::Binary);
        map.insert("unary", TokenKind::Unary);
        map.insert("in", TokenKind::In);
        map.insert("then", TokenKind::Then);
        map
    };
    pub static ref TYPE_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("void", TokenKind::Void);
        map.insert("double", TokenKind::Double);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    EndOfExpression,

    Number,
    String,
    Identifier,

    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    OpenBracket,
    CloseBracket,

    Comma,
    Dot,
    Semicolon,
    Colon,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=
    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Plus,
    Dash,
    Star,
    Slash,
    BackSlash,
    Pipe,
    Ampersand,
    Caret,

    // Keywords
    Fn,
    Extern,
    If,
    Else,
    For,
    Var,
    Return,
    Binary,
    Unary,
    In,
    Then,

    // Types
    Void,
    Double,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw source text, including the quotes of a string literal.
    pub lexeme: String,
    /// Only numbers and strings carry a literal.
    pub literal: Option<String>,
    pub position: Position,
}

impl Token {
    /// Creates the sentinel that terminates a bounded expression slice.
    pub fn end_of_expression(position: Position) -> Self {
        Token {
            kind: TokenKind::EndOfExpression,
            lexeme: String::from(" "),
            literal: None,
            position,
        }
    }

    /// How the token reads in a diagnostic: the quoted lexeme, or
    /// `end of file` for the sentinel.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EOF => String::from("end of file"),
            _ => format!("'{}'", self.lexeme),
        }
    }

    /// The single character this token spells, if it is exactly one ASCII
    /// character long. Operator lookups are keyed on this.
    pub fn single_char(&self) -> Option<char> {
        let mut chars = self.lexeme.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Some(c),
            _ => None,
        }
    }
}
