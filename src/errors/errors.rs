use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

/// The broad class an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Structural,
    Lowering,
    Internal,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// Replaces a null position (errors raised while lowering nodes that carry
    /// no location) with the position of the enclosing declaration.
    pub fn with_fallback_position(mut self, position: Position) -> Self {
        if self.position == Position::null() {
            self.position = position;
        }
        self
    }

    /// Fatal errors mean the token stream itself is broken, so the unit cannot
    /// be parsed any further.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Internal
    }

    pub fn category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::UnexpectedCharacter { .. } | ErrorImpl::UnterminatedString => {
                ErrorCategory::Lexical
            }
            ErrorImpl::UnexpectedTopLevel { .. }
            | ErrorImpl::ExpectedToken { .. }
            | ErrorImpl::UnknownExpressionToken { .. }
            | ErrorImpl::TrailingExpressionToken { .. }
            | ErrorImpl::UnexpectedEndOfFile { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::InvalidArraySize { .. }
            | ErrorImpl::InvalidPrecedence { .. }
            | ErrorImpl::InvalidOperator { .. }
            | ErrorImpl::InvalidOperatorArity { .. }
            | ErrorImpl::MissingPrototypeName { .. }
            | ErrorImpl::MissingReturnType { .. } => ErrorCategory::Syntax,
            ErrorImpl::MissingReturn { .. }
            | ErrorImpl::ReturnInVoidFunction
            | ErrorImpl::ReturnWithoutValue
            | ErrorImpl::ReturnInCondition
            | ErrorImpl::ArraySizeMismatch { .. }
            | ErrorImpl::UnknownVariable { .. }
            | ErrorImpl::UnknownArray { .. } => ErrorCategory::Structural,
            ErrorImpl::UnknownFunction { .. }
            | ErrorImpl::IncorrectArgumentCount { .. }
            | ErrorImpl::InvalidAssignmentTarget
            | ErrorImpl::UnknownUnaryOperator { .. }
            | ErrorImpl::UnknownBinaryOperator { .. }
            | ErrorImpl::FunctionRedefinition { .. }
            | ErrorImpl::InvalidFunction { .. }
            | ErrorImpl::CodegenFailed { .. } => ErrorCategory::Lowering,
            ErrorImpl::CursorOverrun { .. } => ErrorCategory::Internal,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnexpectedCharacter { .. } => "UnexpectedCharacter",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnexpectedTopLevel { .. } => "UnexpectedTopLevel",
            ErrorImpl::ExpectedToken { .. } => "ExpectedToken",
            ErrorImpl::UnknownExpressionToken { .. } => "UnknownExpressionToken",
            ErrorImpl::TrailingExpressionToken { .. } => "TrailingExpressionToken",
            ErrorImpl::UnexpectedEndOfFile { .. } => "UnexpectedEndOfFile",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::InvalidArraySize { .. } => "InvalidArraySize",
            ErrorImpl::InvalidPrecedence { .. } => "InvalidPrecedence",
            ErrorImpl::InvalidOperator { .. } => "InvalidOperator",
            ErrorImpl::InvalidOperatorArity { .. } => "InvalidOperatorArity",
            ErrorImpl::MissingPrototypeName { .. } => "MissingPrototypeName",
            ErrorImpl::MissingReturnType { .. } => "MissingReturnType",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::ReturnInVoidFunction => "ReturnInVoidFunction",
            ErrorImpl::ReturnWithoutValue => "ReturnWithoutValue",
            ErrorImpl::ReturnInCondition => "ReturnInCondition",
            ErrorImpl::ArraySizeMismatch { .. } => "ArraySizeMismatch",
            ErrorImpl::UnknownVariable { .. } => "UnknownVariable",
            ErrorImpl::UnknownArray { .. } => "UnknownArray",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::IncorrectArgumentCount { .. } => "IncorrectArgumentCount",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::UnknownUnaryOperator { .. } => "UnknownUnaryOperator",
            ErrorImpl::UnknownBinaryOperator { .. } => "UnknownBinaryOperator",
            ErrorImpl::FunctionRedefinition { .. } => "FunctionRedefinition",
            ErrorImpl::InvalidFunction { .. } => "InvalidFunction",
            ErrorImpl::CodegenFailed { .. } => "CodegenFailed",
            ErrorImpl::CursorOverrun { .. } => "CursorOverrun",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnterminatedString => {
                ErrorTip::Suggestion(String::from("add a closing '\"' to the string literal"))
            }
            ErrorImpl::UnexpectedTopLevel { .. } => ErrorTip::Suggestion(String::from(
                "only 'fn' definitions and 'extern' declarations may appear at the top level",
            )),
            ErrorImpl::TrailingExpressionToken { .. } => {
                ErrorTip::Suggestion(String::from("did you miss a semicolon or an operator?"))
            }
            ErrorImpl::InvalidOperatorArity { operator, expected, .. } => {
                ErrorTip::Suggestion(format!(
                    "operator '{}' must take exactly {} argument(s)",
                    operator, expected
                ))
            }
            ErrorImpl::InvalidArraySize { .. } => ErrorTip::Suggestion(String::from(
                "array sizes must be whole numbers between 0 and 65536",
            )),
            ErrorImpl::MissingReturnType { .. } => ErrorTip::Suggestion(String::from(
                "add 'void' or 'double' after the parameter list",
            )),
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "every path through `{}` must end in a return",
                function
            )),
            ErrorImpl::ArraySizeMismatch {
                declared,
                initialized,
            } => ErrorTip::Suggestion(format!(
                "declared {} element(s), initialized {}",
                declared, initialized
            )),
            ErrorImpl::IncorrectArgumentCount { expected, received } => ErrorTip::Suggestion(
                format!("expected {} argument(s), received {}", expected, received),
            ),
            ErrorImpl::UnknownVariable { name } => {
                ErrorTip::Suggestion(format!("declare `{}` with 'var' first", name))
            }
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

impl From<inkwell::builder::BuilderError> for Error {
    fn from(error: inkwell::builder::BuilderError) -> Self {
        Error::new(
            ErrorImpl::CodegenFailed {
                message: error.to_string(),
            },
            Position::null(),
        )
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexical
    #[error("unexpected character: {character}")]
    UnexpectedCharacter { character: char },
    #[error("unterminated string")]
    UnterminatedString,

    // Syntax
    #[error("unexpected token at 'top level': '{token}'")]
    UnexpectedTopLevel { token: String },
    #[error("expected {expected}, found {found}")]
    ExpectedToken { expected: String, found: String },
    #[error("unknown token when expecting an expression: '{lexeme}'/{kind}")]
    UnknownExpressionToken { lexeme: String, kind: String },
    #[error("unexpected token '{token}' after expression")]
    TrailingExpressionToken { token: String },
    #[error("{construct} has unexpectedly reached the end of the file")]
    UnexpectedEndOfFile { construct: String },
    #[error("error parsing number: '{token}'")]
    NumberParseError { token: String },
    #[error("expected a number to indicate array size, found '{token}'")]
    InvalidArraySize { token: String },
    #[error("invalid precedence: must be 1..100, found {precedence}")]
    InvalidPrecedence { precedence: String },
    #[error("expected {kind} operator, found '{token}'")]
    InvalidOperator { kind: String, token: String },
    #[error("invalid number of operands for operator '{operator}': expected {expected}, received {received}")]
    InvalidOperatorArity {
        operator: char,
        expected: usize,
        received: usize,
    },
    #[error("expected function name in prototype, found '{token}'")]
    MissingPrototypeName { token: String },
    #[error("expected return type here, found '{token}'")]
    MissingReturnType { token: String },

    // Structural
    #[error("this function needs a return")]
    MissingReturn { function: String },
    #[error("you cannot return a value in a void function")]
    ReturnInVoidFunction,
    #[error("this function must return a value")]
    ReturnWithoutValue,
    #[error("'return' cannot appear in an if or for header")]
    ReturnInCondition,
    #[error("mismatch between declared array size and initialized elements")]
    ArraySizeMismatch { declared: usize, initialized: usize },
    #[error("unknown variable name: {name}")]
    UnknownVariable { name: String },
    #[error("unknown array name: {name}")]
    UnknownArray { name: String },

    // Lowering
    #[error("unknown function referenced: {name}")]
    UnknownFunction { name: String },
    #[error("incorrect # arguments passed")]
    IncorrectArgumentCount { expected: usize, received: usize },
    #[error("destination of '=' must be a variable")]
    InvalidAssignmentTarget,
    #[error("unknown unary operator: {operator}")]
    UnknownUnaryOperator { operator: char },
    #[error("unknown binary operator: {operator}")]
    UnknownBinaryOperator { operator: char },
    #[error("function cannot be redefined: {name}")]
    FunctionRedefinition { name: String },
    #[error("generated code for function '{name}' failed verification")]
    InvalidFunction { name: String },
    #[error("codegen failed: {message}")]
    CodegenFailed { message: String },

    // Internal
    #[error("overshot token list length ({index} >= {length}), the token stream is malformed")]
    CursorOverrun { index: usize, length: usize },
}
