//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants grouped by compilation phase
//! - The per-unit diagnostic sink and its console formatting

pub mod errors;
pub mod handler;

#[cfg(test)]
mod tests;
