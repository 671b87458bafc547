//! Token cursor shared by the expression builder and the AST builder.
//!
//! Both builders walk a token vector that ends in a sentinel (EOF for the
//! whole stream, end-of-expression for a bounded slice). Stepping past the
//! sentinel is a bug in the caller and surfaces as a fatal
//! [`ErrorImpl::CursorOverrun`] rather than a panic.

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position,
};

pub struct Parser {
    /// The list of tokens to parse
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// Whether the enclosing function returns a value. Threaded down into
    /// expression slices so `return` can be validated.
    needs_return_token: bool,
    /// Set while parsing an `if` or `for` header, where `return` is invalid.
    in_condition: bool,
}

impl Parser {
    /// Creates a new Parser over `tokens`.
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            needs_return_token: false,
            in_condition: false,
        }
    }

    fn overrun(&self) -> Error {
        Error::new(
            ErrorImpl::CursorOverrun {
                index: self.pos,
                length: self.tokens.len(),
            },
            self.tokens
                .last()
                .map(|token| token.position)
                .unwrap_or_else(Position::null),
        )
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> Result<&Token, Error> {
        self.tokens.get(self.pos).ok_or_else(|| self.overrun())
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> Result<TokenKind, Error> {
        Ok(self.current_token()?.kind)
    }

    /// Consumes the current token and returns it.
    pub fn advance(&mut self) -> Result<Token, Error> {
        let token = self.current_token()?.clone();
        self.pos += 1;
        Ok(token)
    }

    /// Expects a token of the specified kind.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    /// * `expected` - Human readable description used in the error message
    ///
    /// # Returns
    ///
    /// Returns the consumed token if it matches, otherwise an
    /// [`ErrorImpl::ExpectedToken`] positioned at the offending token.
    pub fn expect(&mut self, expected_kind: TokenKind, expected: &str) -> Result<Token, Error> {
        let token = self.current_token()?;
        if token.kind != expected_kind {
            return Err(Error::new(
                ErrorImpl::ExpectedToken {
                    expected: expected.to_string(),
                    found: token.describe(),
                },
                token.position,
            ));
        }

        self.advance()
    }

    /// Whether the cursor sits on the second to last token (the one right
    /// before the EOF sentinel) or later.
    pub fn is_penultimate(&self) -> bool {
        self.pos + 1 >= self.tokens.len().saturating_sub(1)
    }

    /// Position of the current token, or of the last token if the cursor
    /// has run off the end.
    pub fn get_position(&self) -> Position {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|token| token.position)
            .unwrap_or_else(Position::null)
    }

    pub fn needs_return_token(&self) -> bool {
        self.needs_return_token
    }

    pub fn set_needs_return_token(&mut self, needs_return_token: bool) {
        self.needs_return_token = needs_return_token;
    }

    pub fn in_condition(&self) -> bool {
        self.in_condition
    }

    pub fn set_in_condition(&mut self, in_condition: bool) {
        self.in_condition = in_condition;
    }
}
