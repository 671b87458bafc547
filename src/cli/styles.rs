//! Terminal styling for help output and diagnostics.

use std::io::{self, IsTerminal};

use clap::builder::styling::{AnsiColor, Effects, Style, Styles};

use crate::errors::handler::Severity;

/// Styles for the `--help` output.
pub fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Red for errors, yellow for warnings.
pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Error => AnsiColor::Red.on_default(),
        Severity::Warning => AnsiColor::Yellow.on_default(),
    }
}

/// Whether diagnostics written to stderr should carry ANSI colour. Redirected
/// output and `TERM=dumb` get plain text.
pub fn stderr_supports_color() -> bool {
    io::stderr().is_terminal() && std::env::var("TERM").map_or(true, |term| term != "dumb")
}

/// Wraps `text` in `style` when `enabled`, otherwise returns it unchanged.
pub fn paint(text: &str, style: Style, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }

    format!("{}{}{}", style.render(), text, style.render_reset())
}
