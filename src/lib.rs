//! # lectlang
//!
//! A compiler for the lecture language, a small functional language with
//! numbers, booleans, `let` bindings and single-argument recursive
//! functions, targeting the Trac42 stack machine.
//!
//! ## Pipeline
//!
//! Source text is parsed into an expression tree, then:
//!
//! 1. **Scope resolution** renames every binder to a unique name
//! 2. **Type checking** infers and checks `num`/`bool` types
//! 3. **Lambda lifting** moves every function to the top level, passing
//!    captured variables as extra parameters
//! 4. **Code generation** emits Trac42 instructions with symbolic labels
//! 5. **Linking** replaces labels with instruction indices
//!
//! The linked module runs on the [`vm`] emulator. The [`evaluator`] runs a
//! tree directly, and [`pretty`] prints trees and lifted programs.
//!
//! ## Example
//!
//! ```
//! let unit = lectlang::compile_source("let x = 40 in x + 2").unwrap();
//! assert_eq!(lectlang::vm::execute(&unit.module), Ok(42));
//! ```

pub mod evaluator;
pub mod pretty;
pub mod vm;

pub use lectlang_compiler::{
    CompileOptions, CompiledUnit, Compiler, Instruction, Module, OpCode, Operand,
};
pub use lectlang_core::{
    EvalError, Expr, ExprKind, InternalError, LectError, LexError, LiftedFunction, MachineError,
    ParseError, Program, Span, Type, TypeError,
};
pub use lectlang_parser::parse;

pub use evaluator::{Value, evaluate, evaluate_program};
pub use pretty::{NameMode, pretty, pretty_program};
pub use vm::{Machine, MachineConfig};

/// Parse and compile source text to a linked module.
pub fn compile_source(source: &str) -> Result<CompiledUnit, LectError> {
    compile_source_with(source, CompileOptions::default())
}

/// Parse and compile source text with the given options.
pub fn compile_source_with(
    source: &str,
    options: CompileOptions,
) -> Result<CompiledUnit, LectError> {
    let expr = parse(source)?;
    Compiler::new(options).compile(expr)
}

/// Compile source text and run it on a default machine.
pub fn run_source(source: &str) -> Result<i32, LectError> {
    let unit = compile_source(source)?;
    Ok(vm::execute(&unit.module)?)
}

/// Parse source text and evaluate it without compiling.
pub fn evaluate_source(source: &str) -> Result<Value, LectError> {
    let expr = parse(source)?;
    Ok(evaluate(&expr)?)
}
