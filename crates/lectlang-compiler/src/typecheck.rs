//! Static type checking against explicit annotations.
//!
//! The checker walks a scope-resolved tree with two scope stacks, one for
//! variable types and one for function signatures, pushed and popped in
//! lock-step. Every visited node gets its type recorded in [`Expr::ty`];
//! later passes rely on those decorations. The first violation aborts.
//!
//! Lifted programs can be re-checked with
//! [`TypeChecker::check_program`], which registers every lifted function
//! up front.

use lectlang_core::{BinaryOp, Expr, ExprKind, Program, Span, Type, TypeError};
use rustc_hash::FxHashMap;

/// A function's parameter and return types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Name for diagnostics
    pub display: String,
    /// Parameter types, explicit argument first
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// Type checking pass.
#[derive(Debug, Default)]
pub struct TypeChecker {
    /// Variable environments, innermost last
    variables: Vec<FxHashMap<String, Type>>,

    /// Function environments, innermost last
    functions: Vec<FxHashMap<String, Signature>>,

    /// Signatures of lifted top-level functions
    lifted: FxHashMap<String, Signature>,

    /// Nodes decorated so far
    visited: usize,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check an expression tree and return its type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check(&mut self, expr: &mut Expr) -> Result<Type, TypeError> {
        let ty = self.check_expr(expr)?;
        tracing::debug!(%ty, nodes = self.visited, "type checking complete");
        Ok(ty)
    }

    /// Check a lifted program: every function body, then `main`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check_program(&mut self, program: &mut Program) -> Result<Type, TypeError> {
        for function in &program.functions {
            self.lifted.insert(
                function.name.clone(),
                Signature {
                    display: function.name.clone(),
                    params: function.params.iter().map(|p| p.ty).collect(),
                    return_type: function.return_type,
                },
            );
        }

        for function in &mut program.functions {
            self.push_scope();
            for param in &function.params {
                self.bind_variable(&param.name, param.ty);
            }
            let body_ty = self.check_expr(&mut function.body)?;
            if body_ty != function.return_type {
                return Err(TypeError::ReturnTypeMismatch {
                    function: function.name.clone(),
                    expected: function.return_type,
                    found: body_ty,
                    span: function.body.span,
                });
            }
            self.pop_scope();
        }

        self.check(&mut program.main)
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    fn push_scope(&mut self) {
        self.variables.push(FxHashMap::default());
        self.functions.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.variables.pop();
        self.functions.pop();
    }

    fn bind_variable(&mut self, name: &str, ty: Type) {
        if let Some(scope) = self.variables.last_mut() {
            scope.insert(name.to_string(), ty);
        }
    }

    fn bind_function(&mut self, name: &str, signature: Signature) {
        if let Some(scope) = self.functions.last_mut() {
            scope.insert(name.to_string(), signature);
        }
    }

    fn lookup_variable(&self, name: &str) -> Option<Type> {
        self.variables
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn lookup_function(&self, name: &str) -> Option<&Signature> {
        self.functions.iter().rev().find_map(|scope| scope.get(name))
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn check_expr(&mut self, expr: &mut Expr) -> Result<Type, TypeError> {
        let ty = self.infer(expr)?;
        expr.ty = Some(ty);
        self.visited += 1;
        Ok(ty)
    }

    fn infer(&mut self, expr: &mut Expr) -> Result<Type, TypeError> {
        let span = expr.span;
        match &mut expr.kind {
            ExprKind::Let(let_expr) => {
                let value_ty = self.check_expr(&mut let_expr.value)?;
                self.push_scope();
                self.bind_variable(&let_expr.name.id, value_ty);
                let body_ty = self.check_expr(&mut let_expr.body)?;
                self.pop_scope();
                Ok(body_ty)
            }
            ExprKind::LetRec(def) => {
                self.push_scope();
                self.bind_function(
                    &def.name.id,
                    Signature {
                        display: def.name.display.clone(),
                        params: vec![def.param_type],
                        return_type: def.return_type,
                    },
                );

                self.push_scope();
                self.bind_variable(&def.param.id, def.param_type);
                let body_ty = self.check_expr(&mut def.body)?;
                if body_ty != def.return_type {
                    return Err(TypeError::ReturnTypeMismatch {
                        function: def.name.display.clone(),
                        expected: def.return_type,
                        found: body_ty,
                        span: def.body.span,
                    });
                }
                self.pop_scope();

                let recipient_ty = self.check_expr(&mut def.recipient)?;
                self.pop_scope();
                Ok(recipient_ty)
            }
            ExprKind::Application(app) => {
                let signature = self
                    .lookup_function(&app.callee.id)
                    .cloned()
                    .ok_or_else(|| TypeError::UndeclaredFunction {
                        name: app.callee.display.clone(),
                        span,
                    })?;
                let arg_ty = self.check_expr(&mut app.argument)?;
                expect_argument(&signature, 0, arg_ty, app.argument.span)?;
                Ok(signature.return_type)
            }
            ExprKind::LiftedCall(call) => {
                let signature = self.lifted.get(&call.callee).cloned().ok_or_else(|| {
                    TypeError::UndeclaredFunction {
                        name: call.callee.clone(),
                        span,
                    }
                })?;
                if call.arguments.len() != signature.params.len() {
                    return Err(TypeError::ArityMismatch {
                        function: signature.display,
                        expected: signature.params.len(),
                        found: call.arguments.len(),
                        span,
                    });
                }
                for (index, argument) in call.arguments.iter_mut().enumerate() {
                    let arg_ty = self.check_expr(argument)?;
                    expect_argument(&signature, index, arg_ty, argument.span)?;
                }
                Ok(signature.return_type)
            }
            ExprKind::Sequence(seq) => {
                self.check_expr(&mut seq.first)?;
                self.check_expr(&mut seq.second)
            }
            ExprKind::Binary(binary) => {
                let left = self.check_expr(&mut binary.left)?;
                let right = self.check_expr(&mut binary.right)?;
                check_binary(binary.op, left, right, span)
            }
            ExprKind::Variable(name) => {
                self.lookup_variable(&name.id)
                    .ok_or_else(|| TypeError::UndeclaredVariable {
                        name: name.display.clone(),
                        span,
                    })
            }
            ExprKind::Number(_) => Ok(Type::Num),
            ExprKind::Bool(_) => Ok(Type::Bool),
        }
    }
}

fn expect_argument(
    signature: &Signature,
    index: usize,
    found: Type,
    span: Span,
) -> Result<(), TypeError> {
    match signature.params.get(index) {
        Some(&expected) if expected != found => Err(TypeError::ArgumentTypeMismatch {
            function: signature.display.clone(),
            expected,
            found,
            span,
        }),
        _ => Ok(()),
    }
}

/// Operand rules: `+`, `-` and `<` take numbers; `==` takes two operands
/// of the same type.
fn check_binary(op: BinaryOp, left: Type, right: Type, span: Span) -> Result<Type, TypeError> {
    let mismatch = |message: &'static str| -> Result<Type, TypeError> {
        Err(TypeError::OperandTypeMismatch {
            op,
            left,
            right,
            message,
            span,
        })
    };
    let numeric = left == Type::Num && right == Type::Num;
    match op {
        BinaryOp::Add if numeric => Ok(Type::Num),
        BinaryOp::Add => mismatch("'+' expects number operands"),
        BinaryOp::Sub if numeric => Ok(Type::Num),
        BinaryOp::Sub => mismatch("'-' expects number operands"),
        BinaryOp::Lt if numeric => Ok(Type::Bool),
        BinaryOp::Lt => mismatch("'<' expects number operands"),
        BinaryOp::Eq if left == right => Ok(Type::Bool),
        BinaryOp::Eq => mismatch("'==' expects operands of the same type"),
    }
}

/// Check `expr` with a fresh checker.
pub fn typecheck(expr: &mut Expr) -> Result<Type, TypeError> {
    TypeChecker::new().check(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;

    fn checked(source: &str) -> (Result<Type, TypeError>, Expr) {
        let mut expr = lectlang_parser::parse(source).unwrap();
        resolve(&mut expr);
        let result = typecheck(&mut expr);
        (result, expr)
    }

    fn type_of(source: &str) -> Type {
        checked(source).0.unwrap()
    }

    fn error_of(source: &str) -> TypeError {
        checked(source).0.unwrap_err()
    }

    #[test]
    fn literals() {
        assert_eq!(type_of("1"), Type::Num);
        assert_eq!(type_of("false"), Type::Bool);
    }

    #[test]
    fn let_binding() {
        assert_eq!(type_of("let x = 1 in x + 1"), Type::Num);
        assert_eq!(type_of("let b = true in b == false"), Type::Bool);
    }

    #[test]
    fn comparison_yields_bool() {
        assert_eq!(type_of("1 < 2"), Type::Bool);
        assert_eq!(type_of("(1 < 2) == true"), Type::Bool);
    }

    #[test]
    fn sequence_has_type_of_second() {
        assert_eq!(type_of("1, true"), Type::Bool);
        assert_eq!(type_of("true, 1"), Type::Num);
    }

    #[test]
    fn nested_function_capturing_parameter() {
        let source = "let f x : num -> num = let g z : num -> num = z + x + 2 in g 15 \
                      in let x = 5 in f x == 8";
        assert_eq!(type_of(source), Type::Bool);
    }

    #[test]
    fn recursive_call_in_body() {
        assert_eq!(
            type_of("let f n : num -> num = f (n - 1) in f 3"),
            Type::Num
        );
    }

    #[test]
    fn boolean_added_to_number_is_rejected() {
        let err = error_of("let f x : num -> num = x + 2 in let x = 5 in f x + true == 11");
        let TypeError::OperandTypeMismatch { op, left, right, span, .. } = err else {
            panic!("expected operand mismatch, got {err:?}");
        };
        assert_eq!(op, BinaryOp::Add);
        assert_eq!((left, right), (Type::Num, Type::Bool));
        assert_eq!(span.line, 1);
    }

    #[test]
    fn either_non_numeric_operand_is_rejected() {
        assert!(matches!(
            error_of("true + 1"),
            TypeError::OperandTypeMismatch { .. }
        ));
        assert!(matches!(
            error_of("1 - false"),
            TypeError::OperandTypeMismatch { .. }
        ));
        assert!(matches!(
            error_of("true < false"),
            TypeError::OperandTypeMismatch { .. }
        ));
    }

    #[test]
    fn equality_requires_matching_types() {
        assert!(matches!(
            error_of("1 == true"),
            TypeError::OperandTypeMismatch { op: BinaryOp::Eq, .. }
        ));
    }

    #[test]
    fn undeclared_variable_reports_source_name() {
        let err = error_of("let x = 1 in y");
        assert_eq!(
            err,
            TypeError::UndeclaredVariable {
                name: "y".to_string(),
                span: Span::new(1, 14, 1),
            }
        );
    }

    #[test]
    fn undeclared_function() {
        assert!(matches!(
            error_of("g 1"),
            TypeError::UndeclaredFunction { ref name, .. } if name == "g"
        ));
    }

    #[test]
    fn function_is_not_visible_outside_its_let() {
        assert!(matches!(
            error_of("(let f x : num -> num = x in f 1) + f 2"),
            TypeError::UndeclaredFunction { .. }
        ));
    }

    #[test]
    fn argument_type_mismatch() {
        assert!(matches!(
            error_of("let f x : num -> num = x in f true"),
            TypeError::ArgumentTypeMismatch {
                expected: Type::Num,
                found: Type::Bool,
                ..
            }
        ));
    }

    #[test]
    fn return_type_mismatch() {
        assert!(matches!(
            error_of("let f x : num -> bool = x + 1 in f 1"),
            TypeError::ReturnTypeMismatch {
                expected: Type::Bool,
                found: Type::Num,
                ..
            }
        ));
    }

    #[test]
    fn parameter_not_visible_in_recipient() {
        assert!(matches!(
            error_of("let f x : num -> num = x in x"),
            TypeError::UndeclaredVariable { .. }
        ));
    }

    #[test]
    fn every_node_is_decorated() {
        let (result, expr) = checked("let f x : num -> bool = x < 3 in let y = 1 in (f y, y + 2)");
        assert!(result.is_ok());
        assert!(!expr.any(&|e| e.ty.is_none()));
    }

    #[test]
    fn lifted_call_arity_is_checked() {
        use lectlang_core::{LiftedFunction, Param};

        let param = |name: &str| Param {
            name: name.to_string(),
            display: name.to_string(),
            ty: Type::Num,
        };
        let sp = Span::point(1, 1);
        let mut program = Program {
            functions: vec![LiftedFunction {
                name: "g_0".to_string(),
                params: vec![param("z"), param("x")],
                return_type: Type::Num,
                body: Expr::binary(
                    BinaryOp::Add,
                    Expr::variable("z", sp),
                    Expr::variable("x", sp),
                    sp,
                ),
                span: sp,
            }],
            main: Expr::lifted_call("g_0", vec![Expr::number(1, sp)], sp),
        };
        let err = TypeChecker::new().check_program(&mut program).unwrap_err();
        assert!(matches!(
            err,
            TypeError::ArityMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }
}
