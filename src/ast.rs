//! Abstract Syntax Tree definitions for Vanara
//!
//! The tree is immutable after parsing. Every node keeps the token that
//! introduced it; `Display` renders a node back to legal source text,
//! which is also the pretty-print used when inspecting function values.

use std::fmt;

use crate::token::Token;

/// A name, as it appears in source
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Bang,  // !
    Minus, // -
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Bang => f.write_str("!"),
            PrefixOp::Minus => f.write_str("-"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Plus,     // +
    Minus,    // -
    Asterisk, // *
    Slash,    // /
    Lt,       // <
    Gt,       // >
    Eq,       // ==
    NotEq,    // !=
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            InfixOp::Plus => "+",
            InfixOp::Minus => "-",
            InfixOp::Asterisk => "*",
            InfixOp::Slash => "/",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
        };

        f.write_str(op)
    }
}

/// A braced sequence of statements
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Stmt>,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;

        for stmt in &self.statements {
            write!(f, "{} ", stmt)?;
        }

        f.write_str("}")
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Variable reference: foo
    Ident(Identifier),

    /// Integer literal: 42
    Int { token: Token, value: i64 },

    /// String literal: "hello"
    Str { token: Token, value: String },

    /// Boolean literal: true, false
    Bool { token: Token, value: bool },

    /// Null literal
    Null { token: Token },

    /// Prefix operation: !x, -y
    Prefix {
        token: Token,
        op: PrefixOp,
        right: Box<Expr>,
    },

    /// Binary operation: a + b, x == y
    Infix {
        token: Token,
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Conditional expression: if (cond) { } else { }
    If {
        token: Token,
        condition: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },

    /// Function literal: fn(a, b) { a + b }
    Function {
        token: Token,
        parameters: Vec<Identifier>,
        body: Block,
    },

    /// Function call: foo(a, b)
    Call {
        token: Token,
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },

    /// Array literal: [1, 2, 3]
    Array { token: Token, elements: Vec<Expr> },

    /// Index access: arr[0], hash["key"]
    Index {
        token: Token,
        left: Box<Expr>,
        index: Box<Expr>,
    },

    /// Hash literal: {"k": v}; pairs kept in source order,
    /// duplicate keys resolve last-writer at evaluation time
    Hash {
        token: Token,
        pairs: Vec<(Expr, Expr)>,
    },

    /// Assignment: x = v, arr[0] = v. Any left-hand side parses;
    /// invalid targets are rejected at evaluation time
    Assign {
        token: Token,
        left: Box<Expr>,
        value: Box<Expr>,
    },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(ident) => write!(f, "{}", ident),
            Expr::Int { value, .. } => write!(f, "{}", value),
            Expr::Str { value, .. } => write!(f, "\"{}\"", value),
            Expr::Bool { value, .. } => write!(f, "{}", value),
            Expr::Null { .. } => f.write_str("null"),
            Expr::Prefix { op, right, .. } => write!(f, "({}{})", op, right),
            Expr::Infix {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op, right),
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if ({}) {}", condition, consequence)?;

                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }

                Ok(())
            }
            Expr::Function {
                parameters, body, ..
            } => {
                let params: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                write!(f, "fn({}) {}", params.join(", "), body)
            }
            Expr::Call {
                function,
                arguments,
                ..
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
            Expr::Array { elements, .. } => {
                let elements: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", elements.join(", "))
            }
            Expr::Index { left, index, .. } => write!(f, "({}[{}])", left, index),
            Expr::Hash { pairs, .. } => {
                let pairs: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Expr::Assign { left, value, .. } => write!(f, "({} = {})", left, value),
        }
    }
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Binding: let x = expr;
    Let {
        token: Token,
        name: Identifier,
        value: Expr,
    },

    /// Early exit: return expr; — the expression is optional
    Return { token: Token, value: Option<Expr> },

    /// A bare expression in statement position
    Expr { token: Token, expression: Expr },
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value, .. } => write!(f, "let {} = {};", name, value),
            Stmt::Return { value: Some(v), .. } => write!(f, "return {};", v),
            Stmt::Return { value: None, .. } => f.write_str("return;"),
            Stmt::Expr { expression, .. } => write!(f, "{}", expression),
        }
    }
}

/// A complete program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }

            write!(f, "{}", stmt)?;
        }

        Ok(())
    }
}
