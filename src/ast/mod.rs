//! Abstract Syntax Tree (AST) definitions.
//!
//! This module contains the node model produced by the parser:
//!
//! - `ast`: the closed `Node` sum type covering expressions and statements
//! - `prototype`: function prototypes, their arguments and full definitions

pub mod ast;
pub mod prototype;
