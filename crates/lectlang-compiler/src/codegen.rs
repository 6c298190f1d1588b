//! Trac42 code generation.
//!
//! Compiles a lifted [`Program`] into a [`Module`]: every lifted function
//! in order, then the `main` label, the main expression and `END`.
//!
//! ## Frame layout
//!
//! ```text
//!   FP + 2 + n   return slot         (reserved by the caller)
//!   FP + 2 ...   parameters          (explicit argument at FP + 2)
//!   FP + 1       return address      (pushed by BSR)
//!   FP + 0       saved frame pointer (pushed by LINK)
//!   FP - 1 ...   let slots and temporaries
//! ```
//!
//! Every expression leaves exactly one word on the stack. A `let` reserves
//! a result slot and a local slot, stores the bound value in the local,
//! stores the body's value in the result slot and releases the local, so
//! its value survives on top of the stack.

use lectlang_core::{
    BinaryOp, Expr, ExprKind, InternalError, LiftedFunction, Program, Type,
};

use crate::bytecode::{MAIN_LABEL, Module, OpCode};
use crate::emit::InstructionEmitter;
use crate::frame::FrameLayout;

/// Code generation pass.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    emitter: InstructionEmitter,
    frame: FrameLayout,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a lifted program into an unlinked module.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self, program: &Program) -> Result<Module, InternalError> {
        for function in &program.functions {
            self.generate_function(function)?;
        }

        self.frame = FrameLayout::for_main();
        self.emitter.reset_depth();
        self.emitter.emit_label(MAIN_LABEL)?;
        self.generate_expr(&program.main)?;
        self.emitter.emit(OpCode::End);

        let module = self.emitter.finish();
        tracing::debug!(
            functions = program.functions.len(),
            instructions = module.len(),
            "code generation complete"
        );
        Ok(module)
    }

    fn generate_function(&mut self, function: &LiftedFunction) -> Result<(), InternalError> {
        self.frame = FrameLayout::for_function(&function.params);
        let return_offset = self.frame.return_offset().ok_or_else(|| {
            InternalError::UnboundOffset {
                name: format!("return slot of '{}'", function.name),
            }
        })?;
        tracing::trace!(function = %function.name, arity = function.arity(), return_offset, "generating function");

        self.emitter.emit_label(&function.name)?;
        self.emitter.emit(OpCode::Link);
        self.emitter.reset_depth();
        self.emitter.emit_lval(return_offset);
        self.generate_expr(&function.body)?;
        self.emitter.emit_store(function.return_type);
        self.emitter.emit(OpCode::Unlink);
        self.emitter.emit(OpCode::Rts);
        Ok(())
    }

    fn generate_expr(&mut self, expr: &Expr) -> Result<(), InternalError> {
        match &expr.kind {
            ExprKind::Let(let_expr) => {
                let value_ty = checked_type(&let_expr.value)?;
                let body_ty = checked_type(&let_expr.body)?;

                let result_offset = self.emitter.next_slot_offset();
                self.emitter.emit_decl(1);
                let local_offset = self.emitter.next_slot_offset();
                self.emitter.emit_decl(1);

                self.emitter.emit_lval(local_offset);
                self.generate_expr(&let_expr.value)?;
                self.emitter.emit_store(value_ty);

                tracing::trace!(name = %let_expr.name.id, offset = local_offset, "bound local");
                self.frame
                    .declare_local(&let_expr.name.id, value_ty, local_offset);
                self.emitter.emit_lval(result_offset);
                self.generate_expr(&let_expr.body)?;
                self.emitter.emit_store(body_ty);
                self.frame.release_local();

                self.emitter.emit_pop(1);
            }
            ExprKind::LiftedCall(call) => {
                self.emitter.emit_decl(1);
                for argument in call.arguments.iter().rev() {
                    self.generate_expr(argument)?;
                }
                self.emitter.emit_call(&call.callee);
                self.emitter.emit_pop(call.arguments.len() as i32);
            }
            ExprKind::Sequence(seq) => {
                self.generate_expr(&seq.first)?;
                self.emitter.emit_pop(1);
                self.generate_expr(&seq.second)?;
            }
            ExprKind::Binary(binary) => {
                self.generate_expr(&binary.left)?;
                self.generate_expr(&binary.right)?;
                let op = match binary.op {
                    BinaryOp::Add => OpCode::Add,
                    BinaryOp::Sub => OpCode::Sub,
                    BinaryOp::Lt => OpCode::LtInt,
                    BinaryOp::Eq => match checked_type(&binary.left)? {
                        Type::Num => OpCode::EqInt,
                        Type::Bool => OpCode::EqBool,
                    },
                };
                self.emitter.emit(op);
            }
            ExprKind::Variable(name) => {
                let slot = self
                    .frame
                    .get(&name.id)
                    .ok_or_else(|| InternalError::UnboundOffset {
                        name: name.id.clone(),
                    })?;
                self.emitter.emit_load(slot.ty, slot.offset);
            }
            ExprKind::Number(value) => self.emitter.push_int(*value),
            ExprKind::Bool(value) => self.emitter.push_bool(*value),
            ExprKind::LetRec(_) | ExprKind::Application(_) => {
                return Err(InternalError::UnexpectedNode {
                    pass: "code generation",
                    node: expr.kind_name(),
                });
            }
        }
        Ok(())
    }
}

fn checked_type(expr: &Expr) -> Result<Type, InternalError> {
    expr.ty.ok_or_else(|| InternalError::MissingType {
        what: format!("{} at {}", expr.kind_name(), expr.span),
    })
}

/// Generate code for `program` with a fresh generator.
pub fn generate(program: &Program) -> Result<Module, InternalError> {
    CodeGenerator::new().generate(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lift::lift;
    use crate::resolve::resolve;
    use crate::typecheck::typecheck;

    fn compile(source: &str) -> Module {
        let mut expr = lectlang_parser::parse(source).unwrap();
        resolve(&mut expr);
        typecheck(&mut expr).unwrap();
        generate(&lift(expr).unwrap()).unwrap()
    }

    fn listing(module: &Module) -> Vec<String> {
        module.instructions().iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn literal_program() {
        let module = compile("42");
        assert_eq!(listing(&module), ["LABEL main", "PUSHINT 42", "END"]);
    }

    #[test]
    fn let_uses_result_and_local_slots() {
        let module = compile("let x = 1 in x + 1");
        assert_eq!(
            listing(&module),
            [
                "LABEL main",
                "DECL 1",
                "DECL 1",
                "LVAL -2(FP)",
                "PUSHINT 1",
                "ASSINT",
                "LVAL -1(FP)",
                "RVALINT -2(FP)",
                "PUSHINT 1",
                "ADD",
                "ASSINT",
                "POP 1",
                "END",
            ]
        );
    }

    #[test]
    fn let_inside_operand_accounts_for_temporaries() {
        let module = compile("1 + (let y = 2 in y)");
        let lines = listing(&module);
        // PUSHINT 1 occupies -1, so the let's slots are -2 and -3.
        assert_eq!(lines[1], "PUSHINT 1");
        assert_eq!(lines[4], "LVAL -3(FP)");
        assert!(lines.contains(&"RVALINT -3(FP)".to_string()));
        assert!(lines.contains(&"LVAL -2(FP)".to_string()));
    }

    #[test]
    fn equality_picks_operand_type() {
        assert!(listing(&compile("1 == 2")).contains(&"EQINT".to_string()));
        assert!(listing(&compile("true == false")).contains(&"EQBOOL".to_string()));
        assert!(listing(&compile("1 < 2")).contains(&"LTINT".to_string()));
    }

    #[test]
    fn booleans_push_as_words() {
        let lines = listing(&compile("true, false"));
        assert_eq!(
            lines,
            ["LABEL main", "PUSHBOOL 1", "POP 1", "PUSHBOOL 0", "END"]
        );
    }

    #[test]
    fn function_prologue_and_epilogue() {
        let module = compile("let f x : num -> num = x + 2 in f 3");
        assert_eq!(
            listing(&module),
            [
                "LABEL f_0",
                "LINK",
                "LVAL 3(FP)",
                "RVALINT 2(FP)",
                "PUSHINT 2",
                "ADD",
                "ASSINT",
                "UNLINK",
                "RTS",
                "LABEL main",
                "DECL 1",
                "PUSHINT 3",
                "BSR f_0",
                "POP 1",
                "END",
            ]
        );
    }

    #[test]
    fn call_pushes_arguments_in_reverse() {
        let module = compile(
            "let f x : num -> num = let g z : num -> num = z + x + 2 in g 15 \
             in let x = 5 in f x == 8",
        );
        let lines = listing(&module);
        let call = lines.iter().position(|l| l == "BSR g_0").unwrap();
        assert_eq!(lines[call - 3], "DECL 1");
        assert_eq!(lines[call - 2], "RVALINT 2(FP)");
        assert_eq!(lines[call - 1], "PUSHINT 15");
        assert_eq!(lines[call + 1], "POP 2");
    }

    #[test]
    fn bool_function_uses_bool_store() {
        let lines = listing(&compile("let f b : bool -> bool = b == true in f false"));
        assert!(lines.contains(&"RVALBOOL 2(FP)".to_string()));
        assert!(lines.contains(&"ASSBOOL".to_string()));
    }

    #[test]
    fn surface_nodes_are_rejected() {
        let sp = lectlang_core::Span::point(1, 1);
        let program = Program {
            functions: Vec::new(),
            main: Expr::application("f", Expr::number(1, sp), sp),
        };
        assert!(matches!(
            generate(&program),
            Err(InternalError::UnexpectedNode { node: "application", .. })
        ));
    }

    #[test]
    fn unknown_variable_has_no_offset() {
        let sp = lectlang_core::Span::point(1, 1);
        let program = Program {
            functions: Vec::new(),
            main: Expr::variable("ghost", sp).with_type(Type::Num),
        };
        assert!(matches!(
            generate(&program),
            Err(InternalError::UnboundOffset { .. })
        ));
    }
}
