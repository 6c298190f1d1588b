//! Compiler passes for the lecture language.
//!
//! The passes run in this order:
//!
//! 1. [`resolve`] - alpha-renaming, every binder gets a unique name
//! 2. [`typecheck`] - type inference and checking, decorates every node
//! 3. [`lift`] - lambda lifting (uses [`free_vars`] for captures)
//! 4. [`codegen`] - Trac42 instruction generation
//! 5. [`link`] - label resolution
//!
//! [`Compiler`] chains them over one expression tree.

pub mod bytecode;
pub mod codegen;
pub mod emit;
pub mod frame;
pub mod free_vars;
pub mod lift;
pub mod link;
pub mod resolve;
pub mod typecheck;

pub use bytecode::{Instruction, MAIN_LABEL, Module, OpCode, Operand};
pub use codegen::{CodeGenerator, generate};
pub use free_vars::{FreeVar, FreeVariableAnalyzer, FreeVariables, free_variables};
pub use lift::{LambdaLifter, lift};
pub use link::{Linker, link};
pub use resolve::{ScopeResolver, resolve};
pub use typecheck::{Signature, TypeChecker, typecheck};

use lectlang_core::{Expr, LectError, Program, Type};

/// Options for a [`Compiler`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Keep the checked tree and the unlinked module in the result.
    pub trace_stages: bool,
}

impl CompileOptions {
    /// Options that keep every intermediate stage.
    pub fn traced() -> Self {
        Self { trace_stages: true }
    }
}

/// Output of a full compilation.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    /// Type of the whole program
    pub ty: Type,

    /// The resolved and type-decorated tree (when tracing stages)
    pub checked: Option<Expr>,

    /// The lambda-lifted program
    pub program: Program,

    /// Module before label resolution (when tracing stages)
    pub unlinked: Option<crate::Module>,

    /// Linked module, ready to run
    pub module: crate::Module,
}

/// Pipeline driver.
#[derive(Debug, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Compile a parsed expression to a linked module.
    ///
    /// Type errors abort before lifting. Any other failure is an internal
    /// error.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, mut expr: Expr) -> Result<CompiledUnit, LectError> {
        resolve(&mut expr);
        let ty = typecheck(&mut expr)?;
        let checked = self.options.trace_stages.then(|| expr.clone());

        let program = lift(expr)?;
        let mut module = generate(&program)?;
        let unlinked = self.options.trace_stages.then(|| module.clone());
        link(&mut module)?;

        tracing::debug!(
            %ty,
            functions = program.functions.len(),
            instructions = module.len(),
            "compilation complete"
        );
        Ok(CompiledUnit {
            ty,
            checked,
            program,
            unlinked,
            module,
        })
    }
}

/// Compile `expr` with the given options.
pub fn compile(expr: Expr, options: CompileOptions) -> Result<CompiledUnit, LectError> {
    Compiler::new(options).compile(expr)
}
