//! Code generation module for the compiler.
//!
//! This module contains the LLVM-based backend that receives declarations
//! from the AST builder through the `Lowering` trait. It handles:
//!
//! - Compilation of expressions and statements
//! - Mapping of argument and return types to LLVM types
//! - The built-in `print` and `newLine` functions
//! - Target setup and object file emission

pub mod builtins;
pub mod compiler;
pub mod expr;
pub mod stmt;
