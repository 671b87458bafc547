//! Parsing of a token stream into declarations.
//!
//! Two builders share one token cursor ([`parser::Parser`]):
//!
//! - The AST builder ([`stmt`]) walks the whole stream. It recognizes
//!   function definitions and extern declarations, parses prototypes, blocks,
//!   `if` and `for`, and enforces that non-void functions return on every
//!   path.
//! - The expression builder ([`expr`]) parses one bounded slice at a time by
//!   precedence climbing, so user declared `binary` operators slot into the
//!   grammar without new rules.
//!
//! Per unit state (operator precedence, the current function's variables and
//! arrays) lives in an explicit [`context::ParseContext`]. Parsed
//! declarations leave through the [`lowering::Lowering`] trait.

pub mod context;
pub mod expr;
pub mod lookups;
pub mod lowering;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
