//! Lambda lifting.
//!
//! Every `LetRec` becomes a top-level [`LiftedFunction`] whose parameters
//! are its explicit argument followed by the variables it captures. Every
//! `Application` becomes a [`LiftedCallExpr`] passing the argument and then
//! the captured variables, in the same order.
//!
//! A function's lift-map entry is installed before its body is lifted, so
//! recursive calls inside the body are rewritten too, and stays active
//! while its recipient is lifted. Captures are computed on the function's
//! body before it is rewritten; a call to an enclosing function counts as
//! referencing that function's captures.
//!
//! Nested functions are registered before the functions that contain
//! them.

use lectlang_core::{
    ApplicationExpr, BinaryExpr, Expr, ExprKind, InternalError, LetExpr, LetRecExpr,
    LiftedCallExpr, LiftedFunction, Name, Param, Program, SequenceExpr, Span, Type,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::free_vars::{CalleeCaptures, FreeVar, FreeVariableAnalyzer};

/// An active function binding: its generated name and ordered captures.
#[derive(Debug, Clone)]
struct LiftEntry {
    generated: String,
    captures: Vec<FreeVar>,
}

/// Lambda lifting pass.
#[derive(Debug, Default)]
pub struct LambdaLifter {
    /// Lifted functions, in registration order
    functions: Vec<LiftedFunction>,

    /// Generated names handed out so far
    used_names: FxHashSet<String>,

    /// Next suffix per original function name
    counters: FxHashMap<String, u32>,

    /// Active bindings per function name, innermost last
    lift_map: FxHashMap<String, Vec<LiftEntry>>,
}

impl CalleeCaptures for LambdaLifter {
    fn captures_of(&self, callee: &str) -> Option<&[FreeVar]> {
        self.lift_map
            .get(callee)
            .and_then(|entries| entries.last())
            .map(|entry| entry.captures.as_slice())
    }
}

impl LambdaLifter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lift a type-checked expression into a [`Program`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn lift(mut self, expr: Expr) -> Result<Program, InternalError> {
        let main = self.lift_expr(expr)?;
        tracing::debug!(functions = self.functions.len(), "lambda lifting complete");
        Ok(Program {
            functions: self.functions,
            main,
        })
    }

    fn lift_expr(&mut self, expr: Expr) -> Result<Expr, InternalError> {
        let Expr { kind, span, ty } = expr;
        let kind = match kind {
            ExprKind::LetRec(def) => return self.lift_function(def, span),
            ExprKind::Application(app) => return self.rewrite_call(app, span, ty),
            ExprKind::Let(LetExpr { name, value, body }) => ExprKind::Let(LetExpr {
                name,
                value: Box::new(self.lift_expr(*value)?),
                body: Box::new(self.lift_expr(*body)?),
            }),
            ExprKind::LiftedCall(LiftedCallExpr { callee, arguments }) => {
                ExprKind::LiftedCall(LiftedCallExpr {
                    callee,
                    arguments: arguments
                        .into_iter()
                        .map(|argument| self.lift_expr(argument))
                        .collect::<Result<_, _>>()?,
                })
            }
            ExprKind::Sequence(SequenceExpr { first, second }) => {
                ExprKind::Sequence(SequenceExpr {
                    first: Box::new(self.lift_expr(*first)?),
                    second: Box::new(self.lift_expr(*second)?),
                })
            }
            ExprKind::Binary(BinaryExpr { op, left, right }) => ExprKind::Binary(BinaryExpr {
                op,
                left: Box::new(self.lift_expr(*left)?),
                right: Box::new(self.lift_expr(*right)?),
            }),
            leaf @ (ExprKind::Variable(_) | ExprKind::Number(_) | ExprKind::Bool(_)) => leaf,
        };
        Ok(Expr { kind, span, ty })
    }

    /// Turn a `LetRec` into a top-level function; the node itself is
    /// replaced by its lifted recipient.
    fn lift_function(&mut self, def: LetRecExpr, span: Span) -> Result<Expr, InternalError> {
        let LetRecExpr {
            name,
            param,
            param_type,
            return_type,
            body,
            recipient,
        } = def;

        let captures = FreeVariableAnalyzer::new(&*self)
            .with_bound([name.id.as_str(), param.id.as_str()])
            .analyze(&body)
            .into_vec();
        let generated = self.fresh_name(&name.id);
        tracing::trace!(
            function = %name.display,
            lifted = %generated,
            captures = ?captures.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "lifting function"
        );

        let mut params = Vec::with_capacity(captures.len() + 1);
        params.push(Param {
            name: param.id,
            display: param.display,
            ty: param_type,
        });
        for capture in &captures {
            params.push(Param {
                name: capture.name.clone(),
                display: capture.display.clone(),
                ty: capture_type(capture)?,
            });
        }

        self.lift_map
            .entry(name.id.clone())
            .or_default()
            .push(LiftEntry {
                generated: generated.clone(),
                captures,
            });

        let lifted_body = self.lift_expr(*body);
        let lifted_recipient = lifted_body.and_then(|body| {
            self.functions.push(LiftedFunction {
                name: generated,
                params,
                return_type,
                body,
                span,
            });
            self.lift_expr(*recipient)
        });

        if let Some(entries) = self.lift_map.get_mut(&name.id) {
            entries.pop();
        }
        lifted_recipient
    }

    /// Rewrite a call to its lifted function, appending the captures.
    fn rewrite_call(
        &mut self,
        app: ApplicationExpr,
        span: Span,
        ty: Option<Type>,
    ) -> Result<Expr, InternalError> {
        let ApplicationExpr { callee, argument } = app;
        let entry = self
            .lift_map
            .get(&callee.id)
            .and_then(|entries| entries.last())
            .cloned()
            .ok_or_else(|| InternalError::UnliftedFunction {
                name: callee.display.clone(),
            })?;

        let mut arguments = Vec::with_capacity(entry.captures.len() + 1);
        arguments.push(self.lift_expr(*argument)?);
        for capture in entry.captures {
            arguments.push(Expr {
                kind: ExprKind::Variable(Name {
                    id: capture.name,
                    display: capture.display,
                }),
                span,
                ty: capture.ty,
            });
        }

        Ok(Expr {
            kind: ExprKind::LiftedCall(LiftedCallExpr {
                callee: entry.generated,
                arguments,
            }),
            span,
            ty,
        })
    }

    /// `{name}_{k}` for the next unused k.
    fn fresh_name(&mut self, name: &str) -> String {
        let counter = self.counters.entry(name.to_string()).or_insert(0);
        loop {
            let candidate = format!("{name}_{counter}");
            *counter += 1;
            if self.used_names.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

fn capture_type(capture: &FreeVar) -> Result<Type, InternalError> {
    capture.ty.ok_or_else(|| InternalError::MissingType {
        what: format!("captured variable '{}'", capture.display),
    })
}

/// Lift `expr` with a fresh lifter.
pub fn lift(expr: Expr) -> Result<Program, InternalError> {
    LambdaLifter::new().lift(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use crate::typecheck::typecheck;

    fn lifted(source: &str) -> Program {
        let mut expr = lectlang_parser::parse(source).unwrap();
        resolve(&mut expr);
        typecheck(&mut expr).unwrap();
        lift(expr).unwrap()
    }

    fn param_names(function: &LiftedFunction) -> Vec<&str> {
        function.params.iter().map(|p| p.name.as_str()).collect()
    }

    fn has_surface_calls(expr: &Expr) -> bool {
        expr.any(&|e| matches!(e.kind, ExprKind::LetRec(_) | ExprKind::Application(_)))
    }

    #[test]
    fn program_without_functions_is_unchanged() {
        let program = lifted("let x = 1 in x + 1");
        assert!(program.functions.is_empty());
        assert!(matches!(program.main.kind, ExprKind::Let(_)));
    }

    #[test]
    fn nested_function_captures_enclosing_parameter() {
        let program = lifted(
            "let f x : num -> num = let g z : num -> num = z + x + 2 in g 15 \
             in let x = 5 in f x == 8",
        );
        let names: Vec<_> = program.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["g_0", "f_0"]);

        let g = program.function("g_0").unwrap();
        assert_eq!(param_names(g), ["z", "x"]);
        assert_eq!(g.captures().len(), 1);

        let f = program.function("f_0").unwrap();
        assert_eq!(param_names(f), ["x"]);
        let ExprKind::LiftedCall(call) = &f.body.kind else {
            panic!("expected lifted call, got {:?}", f.body.kind);
        };
        assert_eq!(call.callee, "g_0");
        assert_eq!(call.arguments[0].kind, ExprKind::Number(15));
        assert!(matches!(&call.arguments[1].kind, ExprKind::Variable(n) if n.id == "x"));

        assert!(!has_surface_calls(&program.main));
        assert_eq!(program.main.ty, Some(Type::Bool));
    }

    #[test]
    fn recursive_calls_are_rewritten() {
        let program = lifted("let f n : num -> num = f (n - 1) in f 3");
        let f = program.function("f_0").unwrap();
        let ExprKind::LiftedCall(call) = &f.body.kind else {
            panic!("expected lifted call");
        };
        assert_eq!(call.callee, "f_0");
        assert!(!has_surface_calls(&f.body));
    }

    #[test]
    fn captured_variables_carry_their_types() {
        let program = lifted("let b = true in let f n : num -> bool = b in f 1");
        let f = program.function("f_0").unwrap();
        assert_eq!(f.params[1].name, "b");
        assert_eq!(f.params[1].ty, Type::Bool);
    }

    #[test]
    fn inner_function_calling_outer_passes_outer_captures() {
        // h calls f, so h must also receive f's capture `k`.
        let program = lifted(
            "let k = 10 in \
             let f x : num -> num = \
               let h y : num -> num = f (y - 1) in x + k \
             in f 1",
        );
        let h = program.function("h_0").unwrap();
        assert_eq!(param_names(h), ["y", "k"]);
        let ExprKind::LiftedCall(call) = &h.body.kind else {
            panic!("expected lifted call");
        };
        assert_eq!(call.callee, "f_0");
        assert_eq!(call.arguments.len(), 2);
    }

    #[test]
    fn call_arity_matches_definition() {
        let program = lifted(
            "let a = 1 in let b = 2 in let f x : num -> num = x + a + b in f 1 + f 2",
        );
        let f = program.function("f_0").unwrap();
        assert_eq!(f.arity(), 3);
        let arity_ok = !program.main.any(&|e| match &e.kind {
            ExprKind::LiftedCall(call) => call.arguments.len() != 3,
            _ => false,
        });
        assert!(arity_ok);
    }

    #[test]
    fn sibling_functions_with_same_name_get_distinct_names() {
        let program = lifted(
            "(let f x : num -> num = x in f 1), (let f x : num -> num = x + 1 in f 2)",
        );
        let names: Vec<_> = program.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["f_0", "f_1_0"]);
    }

    #[test]
    fn call_outside_binding_is_an_internal_error() {
        let expr = Expr::application("f", Expr::number(1, Span::point(1, 1)), Span::point(1, 1));
        let err = lift(expr).unwrap_err();
        assert_eq!(
            err,
            InternalError::UnliftedFunction {
                name: "f".to_string()
            }
        );
    }

    #[test]
    fn unchecked_capture_is_an_internal_error() {
        let mut expr = lectlang_parser::parse("let y = 1 in let f x : num -> num = x + y in f 1")
            .unwrap();
        resolve(&mut expr);
        assert!(matches!(
            lift(expr),
            Err(InternalError::MissingType { .. })
        ));
    }
}
