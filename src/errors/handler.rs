//! The diagnostic sink shared by every phase of a compilation unit.

use std::fmt::Display;

use tracing::debug;

use crate::Position;

use super::errors::{Error, ErrorTip};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub position: Option<Position>,
    /// A suggestion on how to fix the problem, if one is known.
    pub tip: Option<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    fn location(&self) -> String {
        match self.position {
            Some(position) => format!("[{}]", position),
            None => String::from("[unknown]"),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };

        write!(f, "{:<24}{}: {}", self.location(), label, self.message)
    }
}

/// Append-only collection of the diagnostics raised while compiling one unit.
///
/// Any call to [`ErrorHandler::error`] (or [`ErrorHandler::report`]) flips the
/// `had_error` flag, which gates whether lowering output is written.
#[derive(Debug, Default)]
pub struct ErrorHandler {
    diagnostics: Vec<Diagnostic>,
    had_error: bool,
}

impl ErrorHandler {
    pub fn new() -> Self {
        ErrorHandler::default()
    }

    pub fn error(&mut self, message: impl Into<String>, position: Option<Position>) {
        let diagnostic = Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            position,
            tip: None,
        };
        debug!("diagnostic recorded: {}", diagnostic);

        self.had_error = true;
        self.diagnostics.push(diagnostic);
    }

    pub fn warning(&mut self, message: impl Into<String>, position: Option<Position>) {
        let diagnostic = Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            position,
            tip: None,
        };
        debug!("diagnostic recorded: {}", diagnostic);

        self.diagnostics.push(diagnostic);
    }

    /// Records a typed error together with its tip. A null position is
    /// stored as "unknown".
    pub fn report(&mut self, error: &Error) {
        let position = if *error.get_position() == Position::null() {
            None
        } else {
            Some(*error.get_position())
        };

        self.error(error.to_string(), position);

        if let (ErrorTip::Suggestion(tip), Some(diagnostic)) =
            (error.get_tip(), self.diagnostics.last_mut())
        {
            diagnostic.tip = Some(tip);
        }
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.is_error()).count()
    }

    /// Messages of all recorded errors, in report order.
    pub fn error_messages(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.message.as_str())
            .collect()
    }
}
