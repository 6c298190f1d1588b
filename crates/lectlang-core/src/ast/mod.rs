//! Abstract syntax shared by every pass.

mod expr;
mod ops;
mod program;
mod types;

pub use expr::{
    ApplicationExpr, BinaryExpr, Expr, ExprKind, LetExpr, LetRecExpr, LiftedCallExpr, Name,
    SequenceExpr,
};
pub use ops::{Associativity, BinaryOp};
pub use program::{LiftedFunction, Param, Program};
pub use types::Type;
