use std::fmt::Display;

/// A node of the abstract syntax tree.
///
/// Every node owns its children exclusively. Statements (declarations,
/// blocks, control flow, returns) and expressions share one closed type so
/// that a block is simply a list of nodes and lowering is one exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    NumberLiteral(f64),
    StringLiteral(String),
    VariableRef(String),
    VarDecl {
        name: String,
        initializer: Option<Box<Node>>,
    },
    ArrayDecl {
        name: String,
        size: usize,
        initial_values: Vec<Node>,
    },
    ArrayElementRef {
        array_name: String,
        index: Box<Node>,
    },
    BinaryOp {
        operator: char,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    UnaryOp {
        operator: char,
        operand: Box<Node>,
    },
    Call {
        callee: String,
        args: Vec<Node>,
    },
    Block(Vec<Node>),
    If {
        condition: Box<Node>,
        then_block: Box<Node>,
        else_block: Option<Box<Node>>,
        then_returns: bool,
        else_returns: bool,
    },
    For {
        var_name: String,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        body: Box<Node>,
    },
    Return(Option<Box<Node>>),
}

impl Node {
    pub fn binary(operator: char, lhs: Node, rhs: Node) -> Node {
        Node::BinaryOp {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(operator: char, operand: Node) -> Node {
        Node::UnaryOp {
            operator,
            operand: Box::new(operand),
        }
    }

    /// Whether the node names a storage location that `=` can write to.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Node::VariableRef(_) | Node::ArrayElementRef { .. })
    }

    /// Whether control never falls off the end of this node.
    ///
    /// A return always returns, an `if` returns when both of its branches do,
    /// and a block returns when its last statement does.
    pub fn always_returns(&self) -> bool {
        match self {
            Node::Return(_) => true,
            Node::If {
                then_returns,
                else_returns,
                ..
            } => *then_returns && *else_returns,
            Node::Block(statements) => statements.last().is_some_and(Node::always_returns),
            _ => false,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::NumberLiteral(_) => "NumberLiteral",
            Node::StringLiteral(_) => "StringLiteral",
            Node::VariableRef(_) => "VariableRef",
            Node::VarDecl { .. } => "VarDecl",
            Node::ArrayDecl { .. } => "ArrayDecl",
            Node::ArrayElementRef { .. } => "ArrayElementRef",
            Node::BinaryOp { .. } => "BinaryOp",
            Node::UnaryOp { .. } => "UnaryOp",
            Node::Call { .. } => "Call",
            Node::Block(_) => "Block",
            Node::If { .. } => "If",
            Node::For { .. } => "For",
            Node::Return(_) => "Return",
        }
    }
}

fn write_list(f: &mut std::fmt::Formatter<'_>, nodes: &[Node]) -> std::fmt::Result {
    for node in nodes {
        write!(f, " {}", node)?;
    }
    Ok(())
}

/// S-expression rendering, e.g. `(+ 1 (* 2 3))`. Used for tracing and tests.
impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::NumberLiteral(value) => write!(f, "{}", value),
            Node::StringLiteral(value) => write!(f, "{:?}", value),
            Node::VariableRef(name) => write!(f, "{}", name),
            Node::VarDecl { name, initializer } => match initializer {
                Some(initializer) => write!(f, "(var {} {})", name, initializer),
                None => write!(f, "(var {})", name),
            },
            Node::ArrayDecl {
                name,
                size,
                initial_values,
            } => {
                write!(f, "(array {}[{}]", name, size)?;
                write_list(f, initial_values)?;
                write!(f, ")")
            }
            Node::ArrayElementRef { array_name, index } => {
                write!(f, "{}[{}]", array_name, index)
            }
            Node::BinaryOp { operator, lhs, rhs } => {
                write!(f, "({} {} {})", operator, lhs, rhs)
            }
            Node::UnaryOp { operator, operand } => write!(f, "({} {})", operator, operand),
            Node::Call { callee, args } => {
                write!(f, "(call {}", callee)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Node::Block(statements) => {
                write!(f, "(block")?;
                write_list(f, statements)?;
                write!(f, ")")
            }
            Node::If {
                condition,
                then_block,
                else_block,
                ..
            } => match else_block {
                Some(else_block) => write!(f, "(if {} {} {})", condition, then_block, else_block),
                None => write!(f, "(if {} {})", condition, then_block),
            },
            Node::For {
                var_name,
                start,
                end,
                step,
                body,
            } => {
                write!(f, "(for {} {} {}", var_name, start, end)?;
                if let Some(step) = step {
                    write!(f, " {}", step)?;
                }
                write!(f, " {})", body)
            }
            Node::Return(value) => match value {
                Some(value) => write!(f, "(return {})", value),
                None => write!(f, "(return)"),
            },
        }
    }
}
