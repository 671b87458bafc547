//! Unit tests for error handling.
//!
//! This module contains tests for error types and the diagnostic sink.

use crate::errors::errors::{Error, ErrorCategory, ErrorImpl, ErrorTip};
use crate::errors::handler::{ErrorHandler, Severity};
use crate::Position;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnexpectedCharacter { character: '@' },
        Position::new(3, 10),
    );

    assert_eq!(error.get_error_name(), "UnexpectedCharacter");
    assert_eq!(error.to_string(), "unexpected character: @");
    assert_eq!(error.category(), ErrorCategory::Lexical);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::ExpectedToken {
            expected: String::from("')'"),
            found: String::from("';'"),
        },
        Position::new(42, 7),
    );

    assert_eq!(error.get_position().line, 42);
    assert_eq!(error.get_position().column, Some(7));
}

#[test]
fn test_fallback_position_only_replaces_null() {
    let lowered = Error::new(ErrorImpl::InvalidAssignmentTarget, Position::null())
        .with_fallback_position(Position::new(5, 0));
    assert_eq!(*lowered.get_position(), Position::new(5, 0));

    let parsed = Error::new(ErrorImpl::ReturnInVoidFunction, Position::new(2, 4))
        .with_fallback_position(Position::new(5, 0));
    assert_eq!(*parsed.get_position(), Position::new(2, 4));
}

#[test]
fn test_structural_messages() {
    let missing = Error::new(
        ErrorImpl::MissingReturn {
            function: String::from("f"),
        },
        Position::line_only(1),
    );
    assert_eq!(missing.to_string(), "this function needs a return");
    assert_eq!(missing.category(), ErrorCategory::Structural);

    let mismatch = Error::new(
        ErrorImpl::ArraySizeMismatch {
            declared: 3,
            initialized: 2,
        },
        Position::new(1, 4),
    );
    assert_eq!(
        mismatch.to_string(),
        "mismatch between declared array size and initialized elements"
    );
    assert_eq!(
        mismatch.get_tip().to_string(),
        "declared 3 element(s), initialized 2"
    );
}

#[test]
fn test_only_cursor_overrun_is_fatal() {
    let overrun = Error::new(
        ErrorImpl::CursorOverrun {
            index: 4,
            length: 4,
        },
        Position::null(),
    );
    assert!(overrun.is_fatal());
    assert_eq!(overrun.category(), ErrorCategory::Internal);

    let syntax = Error::new(
        ErrorImpl::UnknownExpressionToken {
            lexeme: String::from("}"),
            kind: String::from("CloseCurly"),
        },
        Position::new(1, 1),
    );
    assert!(!syntax.is_fatal());
}

#[test]
fn test_tip_presence() {
    let error = Error::new(ErrorImpl::UnterminatedString, Position::line_only(1));
    assert!(matches!(error.get_tip(), ErrorTip::Suggestion(_)));

    let error = Error::new(
        ErrorImpl::UnknownArray {
            name: String::from("arr"),
        },
        Position::line_only(1),
    );
    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_handler_sets_had_error_only_on_errors() {
    let mut handler = ErrorHandler::new();
    assert!(!handler.had_error());

    handler.warning("could not parse argument type: s, double assumed", None);
    assert!(!handler.had_error());
    assert_eq!(handler.warning_count(), 1);

    handler.error("unterminated string", Some(Position::line_only(4)));
    assert!(handler.had_error());
    assert_eq!(handler.error_count(), 1);
    assert_eq!(handler.diagnostics().len(), 2);
}

#[test]
fn test_handler_report_uses_error_message() {
    let mut handler = ErrorHandler::new();
    handler.report(&Error::new(
        ErrorImpl::UnknownVariable {
            name: String::from("y"),
        },
        Position::new(2, 8),
    ));
    handler.report(&Error::new(
        ErrorImpl::InvalidAssignmentTarget,
        Position::null(),
    ));

    assert_eq!(
        handler.error_messages(),
        vec![
            "unknown variable name: y",
            "destination of '=' must be a variable"
        ]
    );
    assert_eq!(handler.diagnostics()[0].position, Some(Position::new(2, 8)));
    assert_eq!(handler.diagnostics()[1].position, None);
    assert_eq!(handler.diagnostics()[1].severity, Severity::Error);

    assert_eq!(
        handler.diagnostics()[0].tip.as_deref(),
        Some("declare `y` with 'var' first")
    );
    assert_eq!(handler.diagnostics()[1].tip, None);
}

#[test]
fn test_diagnostic_console_format() {
    let mut handler = ErrorHandler::new();
    handler.error("unexpected character: $", Some(Position::new(1, 5)));
    handler.warning("something odd", Some(Position::line_only(2)));
    handler.error("can't emit object file", None);

    let lines: Vec<String> = handler.diagnostics().iter().map(|d| d.to_string()).collect();

    assert_eq!(
        lines[0],
        format!("{:<24}Error: unexpected character: $", "[line 1, char 5]")
    );
    assert_eq!(lines[1], format!("{:<24}Warning: something odd", "[line 2]"));
    assert_eq!(
        lines[2],
        format!("{:<24}Error: can't emit object file", "[unknown]")
    );
}
