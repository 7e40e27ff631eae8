//! Syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Nodes borrow their tokens from the scanner's output, so a tree lives no
//! longer than the token buffer it was parsed from.  The tree is built once
//! and never mutated afterwards; the resolver annotates variable references
//! through a side table keyed by [`ExprId`] instead of touching the nodes.

use crate::token::Token;

/// Stable identity of an expression node that refers to a binding
/// (`Variable`, `Assign`, `This`, `Super`).  Assigned by the parser in
/// construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub usize);

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree and do
/// **not** retain a reference to the originating [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// **Expression node.**  Every variant owns its sub‑expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Literal(LiteralValue),

    /// Prefix operator: `!isReady` or `-42`.
    Unary {
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr<'a>>),

    /// Variable access.
    Variable { id: ExprId, name: &'a Token<'a> },

    /// `identifier "=" expression`
    Assign {
        id: ExprId,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Function, method or class call.
    Call {
        callee: Box<Expr<'a>>,
        /// The closing `)`, retained for error reporting.
        paren: &'a Token<'a>,
        arguments: Vec<Expr<'a>>,
    },

    /// `object.name`
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// `object.name = value`
    Set {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// `this` inside a method.
    This { id: ExprId, keyword: &'a Token<'a> },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    },
}

/// A named function or method: `name "(" params ")" "{" body "}"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'a> {
    pub name: &'a Token<'a>,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<&'a Token<'a>>,

    pub body: Vec<Stmt<'a>>,
}

/// **Statement node.**  A program is a sequence of these.
///
/// There is no `for` node: the parser desugars `for` loops into a `Block`
/// wrapping a `While`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr<'a>),

    Print(Expr<'a>),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    Block(Vec<Stmt<'a>>),

    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },

    Function(FunctionDecl<'a>),

    Return {
        /// The `return` keyword, for error locations.
        keyword: &'a Token<'a>,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr<'a>>,
    },

    Class {
        name: &'a Token<'a>,

        /// Always an [`Expr::Variable`] when present.
        superclass: Option<Expr<'a>>,

        methods: Vec<FunctionDecl<'a>>,
    },
}
