#![allow(clippy::module_inception)]

use std::fmt::Display;

use clap::builder::styling::Style;

use crate::errors::handler::Diagnostic;

pub mod ast;
pub mod cli;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;

/// A location in the source text. Lines start at 1, columns at 0.
///
/// The column is optional because some diagnostics (for example the ones
/// raised when an expression runs into the end of the file) only know the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: Option<u32>,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position {
            line,
            column: Some(column),
        }
    }

    pub fn line_only(line: u32) -> Self {
        Position { line, column: None }
    }

    pub fn null() -> Self {
        Position {
            line: 0,
            column: None,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.column {
            Some(column) => write!(f, "line {}, char {}", self.line, column),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// Returns the text of the 1-based `line` in `source`, without its newline.
pub fn get_line_at_position(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }

    source
        .split('\n')
        .nth((line - 1) as usize)
        .map(|text| text.trim_end_matches('\r'))
}


/// Renders a diagnostic with an excerpt of the offending source line. Only
/// the header line is painted with `header_style`.
///
/// ```text
/// [line 20, char 8]       Error: message
/// -> main.ds:20
///    |
/// 20 | var a = #;
///    | --------^
/// = tip: ...
/// ```
pub fn render_diagnostic(
    diagnostic: &Diagnostic,
    source: &str,
    file: &str,
    header_style: Option<Style>,
) -> String {
    let mut output = match header_style {
        Some(style) => format!(
            "{}{}{}\n",
            style.render(),
            diagnostic,
            style.render_reset()
        ),
        None => format!("{}\n", diagnostic),
    };
    if let Some(excerpt) = diagnostic
        .position
        .and_then(|position| render_excerpt(position, source, file))
    {
        output.push_str(&excerpt);
    }
    if let Some(tip) = &diagnostic.tip {
        output.push_str(&format!("= tip: {}\n", tip));
    }

    output
}

/// The `-> file:line` header and gutter lines pointing at `position`, or
/// `None` when the line is not part of `source`.
pub fn render_excerpt(position: Position, source: &str, file: &str) -> Option<String> {
    let line_text = get_line_at_position(source, position.line)?;

    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    let mut output = format!("-> {}:{}\n", file, position.line);
    output.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    if let Some(column) = position.column {
        let arrows = (column as usize).saturating_sub(removed_whitespace) + 1;
        output.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    }

    Some(output)
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
