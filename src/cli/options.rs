use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use super::styles::styles;

/// dorsetc compiles Dorset source files to native executables
#[derive(Debug, Parser)]
#[command(name = "dorsetc", author, disable_version_flag = true, styles = styles())]
pub struct Args {
    /// Source file to compile
    pub file: Option<PathBuf>,

    /// Print the scanned tokens as a table
    #[arg(short = 't', long)]
    pub tokens: bool,

    /// Name of the output files, without extension
    #[arg(short = 'o', value_name = "NAME")]
    pub output: Option<String>,

    /// Keep the generated LLVM IR (.ll)
    #[arg(short = 'r', long)]
    pub llvmir: bool,

    /// Keep the intermediate object file (.o)
    #[arg(short = 'b', long)]
    pub keepbin: bool,

    /// Compile the given code instead of a file
    #[arg(short = 's', long, value_name = "CODE", conflicts_with = "file")]
    pub raw_source: Option<String>,

    /// Command used to link the object file
    #[arg(long, value_name = "CMD", default_value = "gcc")]
    pub linker: String,

    /// Enable verbose logging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Show version
    #[arg(short = 'v', long)]
    pub version: bool,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("no source file or raw source given")]
    NoInput,
    #[error("--tokens needs a source file or raw source to scan")]
    TokensWithoutInput,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    File(PathBuf),
    Raw(String),
}

/// Where the `.ll`, the `.o` and the linked executable go.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub ir: PathBuf,
    pub object: PathBuf,
    pub executable: PathBuf,
}

impl OutputPaths {
    /// `-o NAME` wins over the source path; raw source without `-o` uses `a`.
    fn resolve(output: Option<&str>, source: &Source) -> Self {
        match output {
            Some(name) => {
                let stem = Path::new(name).with_extension("");
                OutputPaths {
                    ir: stem.with_extension("ll"),
                    object: stem.with_extension("o"),
                    executable: stem,
                }
            }
            None => {
                let stem = match source {
                    Source::File(path) => path.with_extension(""),
                    Source::Raw(_) => PathBuf::from("a"),
                };
                OutputPaths {
                    ir: stem.with_extension("ll"),
                    object: stem.with_extension("o"),
                    executable: stem.with_extension("out"),
                }
            }
        }
    }
}

/// Command line arguments resolved into what the driver needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    pub source: Source,
    pub show_tokens: bool,
    pub emit_llvm_ir: bool,
    pub keep_binaries: bool,
    pub linker: String,
    pub outputs: OutputPaths,
}

impl CompilerOptions {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let source = match (args.file, args.raw_source) {
            (Some(path), _) => Source::File(path),
            (None, Some(code)) => Source::Raw(code),
            (None, None) if args.tokens => return Err(ConfigError::TokensWithoutInput),
            (None, None) => return Err(ConfigError::NoInput),
        };

        let outputs = OutputPaths::resolve(args.output.as_deref(), &source);

        Ok(CompilerOptions {
            source,
            show_tokens: args.tokens,
            emit_llvm_ir: args.llvmir,
            keep_binaries: args.keepbin,
            linker: args.linker,
            outputs,
        })
    }

    /// The name diagnostics refer to the source by.
    pub fn source_name(&self) -> String {
        match &self.source {
            Source::File(path) => path.display().to_string(),
            Source::Raw(_) => String::from("<raw source>"),
        }
    }

    /// The LLVM module name: the source file name, or `raw` for raw source.
    pub fn module_name(&self) -> String {
        match &self.source {
            Source::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| String::from("main")),
            Source::Raw(_) => String::from("raw"),
        }
    }
}
