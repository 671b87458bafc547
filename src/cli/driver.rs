//! Runs one compilation from source text to a linked executable.

use std::{fs, path::Path, process::Command};

use anyhow::{bail, Context as _};
use inkwell::context::Context;
use tracing::{debug, info, warn};

use crate::{
    compiler::compiler::Compiler,
    errors::handler::{ErrorHandler, Severity},
    lexer::{lexer::scan_tokens, tokens::Token},
    parser::{context::ParseContext, stmt::parse_token_list},
    render_diagnostic,
};

use super::{
    options::{CompilerOptions, Source},
    styles::{paint, severity_style, stderr_supports_color},
};

/// Compiles according to `options` and returns the process exit code:
/// `1` when any error diagnostic was recorded, `0` otherwise.
///
/// Diagnostics are printed even when emitting or linking fails afterwards.
pub fn run(options: &CompilerOptions) -> anyhow::Result<i32> {
    let source = match &options.source {
        Source::File(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        Source::Raw(code) => code.clone(),
    };

    let mut handler = ErrorHandler::new();
    let tokens = scan_tokens(&source, &mut handler);
    info!("scanned {} tokens", tokens.len());

    if options.show_tokens {
        print!("{}", format_token_table(&tokens));
    }

    let context = Context::create();
    let mut compiler = Compiler::new(&context, &options.module_name());
    compiler.install_builtins()?;

    let mut parse_context = ParseContext::new();
    if parse_token_list(tokens, &mut parse_context, &mut compiler, &mut handler).is_err() {
        warn!("parsing stopped before the end of the token stream");
    }

    let emitted = if handler.had_error() {
        debug!("errors recorded, skipping code emission");
        Ok(())
    } else {
        emit(&compiler, options)
    };

    eprint!(
        "{}",
        format_diagnostics(&handler, &source, &options.source_name(), stderr_supports_color())
    );
    emitted?;

    Ok(if handler.had_error() { 1 } else { 0 })
}

fn emit(compiler: &Compiler, options: &CompilerOptions) -> anyhow::Result<()> {
    let outputs = &options.outputs;

    let machine = compiler.configure_target()?;
    compiler.run_passes();

    if options.emit_llvm_ir || options.keep_binaries {
        compiler.write_ir(&outputs.ir)?;
    }

    compiler.emit_object(&machine, &outputs.object)?;
    link(&options.linker, &outputs.object, &outputs.executable)?;

    if !options.keep_binaries {
        remove_intermediate(&outputs.object);
    }

    Ok(())
}

fn link(linker: &str, object: &Path, executable: &Path) -> anyhow::Result<()> {
    let output = Command::new(linker)
        .arg(object)
        .arg("-o")
        .arg(executable)
        .arg("-no-pie")
        .output()
        .with_context(|| format!("failed to run linker '{}'", linker))?;

    if !output.status.success() {
        bail!(
            "linking with '{}' failed:\n{}",
            linker,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    info!("linked {}", executable.display());
    Ok(())
}

fn remove_intermediate(path: &Path) {
    if let Err(error) = fs::remove_file(path) {
        warn!("could not remove {}: {}", path.display(), error);
    }
}

/// The `--tokens` table: kind, lexeme, literal and line, 24 columns each.
pub fn format_token_table(tokens: &[Token]) -> String {
    let mut table = format!(
        "{:<24}{:<24}{:<24}{:<24}\n",
        "Token Type", "Lexeme", "Literal", "Line"
    );

    for token in tokens {
        table.push_str(&format!(
            "{:<24}{:<24}{:<24}{:<24}\n",
            token.kind.to_string(),
            token.lexeme,
            token.literal.as_deref().unwrap_or(""),
            token.position.line
        ));
    }

    table
}

/// Every diagnostic with its excerpt and tip, followed by an error count
/// when compilation failed. `color` paints headers by severity.
pub fn format_diagnostics(handler: &ErrorHandler, source: &str, file: &str, color: bool) -> String {
    let mut output = String::new();

    for diagnostic in handler.diagnostics() {
        let style = color.then(|| severity_style(diagnostic.severity));
        output.push_str(&render_diagnostic(diagnostic, source, file, style));
    }

    if handler.had_error() {
        let summary = format!(
            "{} error(s), {} warning(s)",
            handler.error_count(),
            handler.warning_count()
        );
        output.push_str(&paint(&summary, severity_style(Severity::Error), color));
        output.push('\n');
    }

    output
}
