//! Lifted programs: flat top-level functions plus a main expression.

use super::{Expr, Type};
use crate::Span;

/// A parameter of a lifted function.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Resolved identifier, as used by variable references in the body.
    pub name: String,
    /// Identifier as written in source.
    pub display: String,
    /// Parameter type.
    pub ty: Type,
}

/// A top-level function produced by lambda lifting.
///
/// The first parameter is the function's original explicit argument; the
/// rest are the captured variables, in capture order.
#[derive(Debug, Clone, PartialEq)]
pub struct LiftedFunction {
    /// Generated, program-wide unique name. Also its code label.
    pub name: String,
    /// Ordered parameters.
    pub params: Vec<Param>,
    /// Declared return type.
    pub return_type: Type,
    /// Function body (contains no `LetRec` or `Application`).
    pub body: Expr,
    /// Location of the originating `let` definition.
    pub span: Span,
}

impl LiftedFunction {
    /// Number of parameters, including captures.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameters after the explicit argument.
    pub fn captures(&self) -> &[Param] {
        self.params.get(1..).unwrap_or(&[])
    }
}

/// A lifted program.
///
/// Functions appear in the order the lifter discovered them; a function
/// may call one listed after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Top-level functions.
    pub functions: Vec<LiftedFunction>,
    /// The expression evaluated by `main`.
    pub main: Expr,
}

impl Program {
    /// Find a function by its generated name.
    pub fn function(&self, name: &str) -> Option<&LiftedFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}
