use std::fmt::Display;

use crate::{errors::handler::ErrorHandler, Position};

use super::ast::Node;

/// Precedence a `binary` operator gets when its declaration names none.
pub const DEFAULT_BINARY_PRECEDENCE: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Double,
    String,
}

impl ArgType {
    pub fn from_name(name: &str) -> Option<ArgType> {
        match name {
            "double" => Some(ArgType::Double),
            "string" => Some(ArgType::String),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeArgument {
    pub name: String,
    pub arg_type: ArgType,
}

impl PrototypeArgument {
    /// Builds an argument from a type name. Unknown type names fall back to
    /// `double` and leave a warning behind.
    pub fn new(
        name: &str,
        type_name: &str,
        handler: &mut ErrorHandler,
        position: Option<Position>,
    ) -> Self {
        let arg_type = ArgType::from_name(type_name).unwrap_or_else(|| {
            handler.warning(
                format!("could not parse argument type: {}, double assumed", name),
                position,
            );
            ArgType::Double
        });

        PrototypeArgument {
            name: name.to_string(),
            arg_type,
        }
    }

    pub fn double(name: &str) -> Self {
        PrototypeArgument {
            name: name.to_string(),
            arg_type: ArgType::Double,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Double,
}

/// A function's name, parameters and return type.
///
/// Operator overloads are named `unary<op>` or `binary<op>`; the operator is
/// the last character of the name.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub args: Vec<PrototypeArgument>,
    pub return_type: ReturnType,
    pub is_operator: bool,
    pub precedence: u32,
}

impl Prototype {
    pub fn new(name: &str, args: Vec<PrototypeArgument>, return_type: ReturnType) -> Self {
        Prototype {
            name: name.to_string(),
            args,
            return_type,
            is_operator: false,
            precedence: 0,
        }
    }

    pub fn is_unary_op(&self) -> bool {
        self.is_operator && self.args.len() == 1
    }

    pub fn is_binary_op(&self) -> bool {
        self.is_operator && self.args.len() == 2
    }

    pub fn operator_char(&self) -> Option<char> {
        if self.is_operator {
            self.name.chars().last()
        } else {
            None
        }
    }

    pub fn binary_precedence(&self) -> u32 {
        self.precedence
    }

    pub fn needs_return_value(&self) -> bool {
        self.return_type != ReturnType::Void
    }
}

impl Display for Prototype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let args: Vec<&str> = self.args.iter().map(|a| a.name.as_str()).collect();
        let return_type = match self.return_type {
            ReturnType::Void => "void",
            ReturnType::Double => "double",
        };

        write!(f, "{}({}) {}", self.name, args.join(", "), return_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub prototype: Prototype,
    /// Always a [`Node::Block`].
    pub body: Node,
}

impl FunctionDef {
    pub fn statements(&self) -> &[Node] {
        match &self.body {
            Node::Block(statements) => statements,
            other => std::slice::from_ref(other),
        }
    }
}

impl Display for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(fn {} {})", self.prototype, self.body)
    }
}
