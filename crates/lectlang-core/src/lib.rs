//! Core types for the lecture language toolchain.
//!
//! This crate provides the data model shared by the parser, the compiler
//! passes and the execution back ends:
//! - [`Span`] source locations
//! - [`ast`] expression trees and lifted programs
//! - [`error`] the error hierarchy

pub mod ast;
pub mod error;
mod span;

pub use ast::{
    ApplicationExpr, BinaryExpr, BinaryOp, Expr, ExprKind, LetExpr, LetRecExpr, LiftedCallExpr,
    LiftedFunction, Name, Param, Program, SequenceExpr, Type,
};
pub use error::{
    EvalError, InternalError, LectError, LexError, MachineError, ParseError, ParseErrorKind,
    TypeError,
};
pub use span::Span;
