//! Expression AST nodes.
//!
//! The tree is built once by the parser and then rewritten pass by pass:
//! scope resolution renames [`Name`]s in place, type checking fills in
//! [`Expr::ty`], and lambda lifting replaces `LetRec`/`Application`
//! subtrees with [`ExprKind::LiftedCall`] nodes. Every child is owned by
//! exactly one parent, so in-place rewriting never aliases.
//!
//! # Expression Precedence
//!
//! From loosest to tightest:
//! 0. Sequence (`a, b`)
//! 1. `let ... in ...`
//! 2. Comparison (`==`, `<`)
//! 3. Additive (`+`, `-`)
//! 4. Application argument (`f x`)

use super::{BinaryOp, Type};
use crate::Span;

/// An identifier at a binding or use site.
///
/// `id` is the name every pass works with; scope resolution overwrites it
/// with a program-wide unique spelling. `display` keeps what the user
/// wrote, for diagnostics and pretty-printing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    /// Resolved identifier (equal to `display` before resolution).
    pub id: String,
    /// Identifier as written in source.
    pub display: String,
}

impl Name {
    /// Create a name whose resolved and display forms agree.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            display: name,
        }
    }

    /// Resolved identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.id
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// What kind of expression this is.
    pub kind: ExprKind,
    /// Source location of the first token.
    pub span: Span,
    /// Type recorded by the type checker.
    pub ty: Option<Type>,
}

/// The expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `let x = e in body`
    Let(LetExpr),
    /// `let f x : t -> t = body in recipient`
    LetRec(LetRecExpr),
    /// `f arg`, a call to a function bound by `LetRec`
    Application(ApplicationExpr),
    /// Call to a lifted top-level function
    LiftedCall(LiftedCallExpr),
    /// `first, second`
    Sequence(SequenceExpr),
    /// Binary operation
    Binary(BinaryExpr),
    /// Variable reference
    Variable(Name),
    /// Integer literal
    Number(i32),
    /// Boolean literal
    Bool(bool),
}

/// Non-recursive single binding.
#[derive(Debug, Clone, PartialEq)]
pub struct LetExpr {
    pub name: Name,
    pub value: Box<Expr>,
    pub body: Box<Expr>,
}

/// Single-argument recursive function, visible to its own body and to
/// `recipient`.
#[derive(Debug, Clone, PartialEq)]
pub struct LetRecExpr {
    pub name: Name,
    pub param: Name,
    pub param_type: Type,
    pub return_type: Type,
    pub body: Box<Expr>,
    pub recipient: Box<Expr>,
}

/// Surface-level call by function name.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationExpr {
    pub callee: Name,
    pub argument: Box<Expr>,
}

/// Post-lift call. Argument order matches the callee's parameter list:
/// the explicit argument first, then the captured variables.
#[derive(Debug, Clone, PartialEq)]
pub struct LiftedCallExpr {
    pub callee: String,
    pub arguments: Vec<Expr>,
}

/// Evaluates both sides and yields the second.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceExpr {
    pub first: Box<Expr>,
    pub second: Box<Expr>,
}

/// Binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

impl Expr {
    /// Create an expression node of the given kind.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }

    /// Integer literal.
    pub fn number(value: i32, span: Span) -> Self {
        Self::new(ExprKind::Number(value), span)
    }

    /// Boolean literal.
    pub fn boolean(value: bool, span: Span) -> Self {
        Self::new(ExprKind::Bool(value), span)
    }

    /// Variable reference.
    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Variable(Name::new(name)), span)
    }

    /// `let name = value in body`
    pub fn let_in(name: impl Into<String>, value: Expr, body: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Let(LetExpr {
                name: Name::new(name),
                value: Box::new(value),
                body: Box::new(body),
            }),
            span,
        )
    }

    /// `let name param : param_type -> return_type = body in recipient`
    pub fn let_rec(
        name: impl Into<String>,
        param: impl Into<String>,
        param_type: Type,
        return_type: Type,
        body: Expr,
        recipient: Expr,
        span: Span,
    ) -> Self {
        Self::new(
            ExprKind::LetRec(LetRecExpr {
                name: Name::new(name),
                param: Name::new(param),
                param_type,
                return_type,
                body: Box::new(body),
                recipient: Box::new(recipient),
            }),
            span,
        )
    }

    /// `callee argument`
    pub fn application(callee: impl Into<String>, argument: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Application(ApplicationExpr {
                callee: Name::new(callee),
                argument: Box::new(argument),
            }),
            span,
        )
    }

    /// Call to a lifted function.
    pub fn lifted_call(callee: impl Into<String>, arguments: Vec<Expr>, span: Span) -> Self {
        Self::new(
            ExprKind::LiftedCall(LiftedCallExpr {
                callee: callee.into(),
                arguments,
            }),
            span,
        )
    }

    /// `first, second`
    pub fn sequence(first: Expr, second: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Sequence(SequenceExpr {
                first: Box::new(first),
                second: Box::new(second),
            }),
            span,
        )
    }

    /// `left op right`
    pub fn binary(op: BinaryOp, left: Expr, right: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Binary(BinaryExpr {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }),
            span,
        )
    }

    /// Attach a type, as the checker does.
    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Let(e) => vec![&e.value, &e.body],
            ExprKind::LetRec(e) => vec![&e.body, &e.recipient],
            ExprKind::Application(e) => vec![&e.argument],
            ExprKind::LiftedCall(e) => e.arguments.iter().collect(),
            ExprKind::Sequence(e) => vec![&e.first, &e.second],
            ExprKind::Binary(e) => vec![&e.left, &e.right],
            ExprKind::Variable(_) | ExprKind::Number(_) | ExprKind::Bool(_) => Vec::new(),
        }
    }

    /// Whether this node or any descendant satisfies `pred`.
    pub fn any(&self, pred: &impl Fn(&Expr) -> bool) -> bool {
        pred(self) || self.children().into_iter().any(|child| child.any(pred))
    }

    /// Short name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Let(_) => "let",
            ExprKind::LetRec(_) => "let rec",
            ExprKind::Application(_) => "application",
            ExprKind::LiftedCall(_) => "lifted call",
            ExprKind::Sequence(_) => "sequence",
            ExprKind::Binary(_) => "binary operation",
            ExprKind::Variable(_) => "variable",
            ExprKind::Number(_) => "number",
            ExprKind::Bool(_) => "boolean",
        }
    }
}
