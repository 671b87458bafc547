//! Per compilation unit parsing state.
//!
//! The precedence table lives for the whole unit, so a `binary` operator
//! declared by one function can be used by every function after it. The
//! scope of declared variables and arrays is function local and is reset by
//! [`ParseContext::enter_function`].

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{ast::prototype::Prototype, lexer::tokens::Token};

use super::lookups::{DEFAULT_PRECEDENCE, NO_PRECEDENCE};

#[derive(Debug, Clone)]
pub struct ParseContext {
    precedence: HashMap<char, i32>,
    variables: HashSet<String>,
    arrays: HashMap<String, usize>,
}

impl Default for ParseContext {
    fn default() -> Self {
        ParseContext {
            precedence: DEFAULT_PRECEDENCE.clone(),
            variables: HashSet::new(),
            arrays: HashMap::new(),
        }
    }
}

impl ParseContext {
    pub fn new() -> Self {
        ParseContext::default()
    }

    pub fn precedence_of(&self, operator: char) -> Option<i32> {
        self.precedence.get(&operator).copied()
    }

    /// Binding power of `token` when it appears between two operands.
    ///
    /// Only single character tokens can be binary operators; everything else,
    /// and any entry that is not positive, reports [`NO_PRECEDENCE`].
    pub fn token_precedence(&self, token: &Token) -> i32 {
        token
            .single_char()
            .and_then(|c| self.precedence_of(c))
            .filter(|precedence| *precedence > 0)
            .unwrap_or(NO_PRECEDENCE)
    }

    pub fn install_binary_operator(&mut self, operator: char, precedence: u32) {
        debug!("installing binary operator '{}' at precedence {}", operator, precedence);
        self.precedence.insert(operator, precedence as i32);
    }

    /// Starts a new function scope containing only the prototype's parameters.
    pub fn enter_function(&mut self, prototype: &Prototype) {
        self.variables.clear();
        self.arrays.clear();

        for arg in prototype.args.iter() {
            self.variables.insert(arg.name.clone());
        }
    }

    /// Declares a scalar variable. Returns false if the name was already in scope.
    pub fn declare_variable(&mut self, name: &str) -> bool {
        self.variables.insert(name.to_string())
    }

    pub fn forget_variable(&mut self, name: &str) {
        self.variables.remove(name);
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    pub fn declare_array(&mut self, name: &str, size: usize) {
        self.arrays.insert(name.to_string(), size);
    }

    pub fn array_size(&self, name: &str) -> Option<usize> {
        self.arrays.get(name).copied()
    }
}
