//! Utility macros for the compiler.
//!
//! This module defines helper macros used throughout the compiler:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_ERROR!` - Creates a positioned Error from an ErrorImpl variant
//!
//! These macros reduce boilerplate in the lexer and the two builders.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$lexeme` - The raw source text of the token
/// * `$literal` - The literal value (`Option<String>`), only set for numbers and strings
/// * `$position` - The source position of the first character
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), Some("42".to_string()), position);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $lexeme:expr, $literal:expr, $position:expr) => {
        Token {
            kind: $kind,
            lexeme: $lexeme,
            literal: $literal,
            position: $position,
        }
    };
}

/// Creates an `Err(Error)` for the given ErrorImpl variant and position.
///
/// # Example
///
/// ```ignore
/// return MK_ERROR!(ErrorImpl::UnterminatedString, parser.get_position());
/// ```
#[macro_export]
macro_rules! MK_ERROR {
    ($error:expr, $position:expr) => {
        Err($crate::errors::errors::Error::new($error, $position))
    };
}
