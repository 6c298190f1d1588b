//! Tree-walking evaluator.
//!
//! Runs an expression tree directly, without compiling it. Works on raw,
//! scope-resolved and lambda-lifted trees. Functions are closures over
//! the environment they were defined in, so a call sees the bindings of
//! its definition site whether or not the tree was resolved first.

use std::fmt;
use std::rc::Rc;

use lectlang_core::{BinaryOp, EvalError, Expr, ExprKind, LetRecExpr, LiftedFunction, Program};
use rustc_hash::FxHashMap;

/// A runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Num(i32),
    Bool(bool),
}

impl Value {
    /// The Trac42 word for this value.
    pub fn to_word(self) -> i32 {
        match self {
            Value::Num(n) => n,
            Value::Bool(b) => i32::from(b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

#[derive(Debug)]
enum Binding<'e> {
    Variable(&'e str, Value),
    Function(&'e LetRecExpr, Env<'e>),
}

#[derive(Debug)]
struct Frame<'e> {
    binding: Binding<'e>,
    parent: Env<'e>,
}

/// Persistent environment; extending it never disturbs existing handles.
/// Variables and functions live in separate namespaces.
#[derive(Debug, Clone, Default)]
struct Env<'e> {
    head: Option<Rc<Frame<'e>>>,
}

impl<'e> Env<'e> {
    fn extend(&self, binding: Binding<'e>) -> Self {
        Env {
            head: Some(Rc::new(Frame {
                binding,
                parent: self.clone(),
            })),
        }
    }

    fn frames(&self) -> impl Iterator<Item = &Frame<'e>> {
        std::iter::successors(self.head.as_deref(), |frame| frame.parent.head.as_deref())
    }

    fn variable(&self, name: &str) -> Option<Value> {
        self.frames().find_map(|frame| match &frame.binding {
            Binding::Variable(bound, value) if *bound == name => Some(*value),
            _ => None,
        })
    }

    fn function(&self, name: &str) -> Option<(&'e LetRecExpr, Env<'e>)> {
        self.frames().find_map(|frame| match &frame.binding {
            Binding::Function(def, env) if def.name.id == name => Some((*def, env.clone())),
            _ => None,
        })
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Tree-walking interpreter.
#[derive(Debug, Default)]
pub struct Evaluator<'p> {
    /// Top-level functions of a lifted program
    functions: FxHashMap<&'p str, &'p LiftedFunction>,

    /// Function calls performed
    calls: usize,
}

impl<'p> Evaluator<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    /// An evaluator that can call the lifted functions of `program`.
    pub fn for_program(program: &'p Program) -> Self {
        Self {
            functions: program
                .functions
                .iter()
                .map(|function| (function.name.as_str(), function))
                .collect(),
            calls: 0,
        }
    }

    /// Number of function calls performed so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Evaluate `expr` in an empty environment.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn evaluate<'e>(&mut self, expr: &'e Expr) -> Result<Value, EvalError>
    where
        'p: 'e,
    {
        let value = self.eval(expr, &Env::default())?;
        tracing::debug!(%value, calls = self.calls, "evaluation complete");
        Ok(value)
    }

    fn eval<'e>(&mut self, expr: &'e Expr, env: &Env<'e>) -> Result<Value, EvalError>
    where
        'p: 'e,
    {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Num(*n)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Variable(name) => {
                env.variable(&name.id)
                    .ok_or_else(|| EvalError::UnboundVariable {
                        name: name.display.clone(),
                        span: expr.span,
                    })
            }
            ExprKind::Let(let_expr) => {
                let value = self.eval(&let_expr.value, env)?;
                let env = env.extend(Binding::Variable(&let_expr.name.id, value));
                self.eval(&let_expr.body, &env)
            }
            ExprKind::LetRec(def) => {
                let env = env.extend(Binding::Function(def, env.clone()));
                self.eval(&def.recipient, &env)
            }
            ExprKind::Application(app) => {
                let (def, def_env) =
                    env.function(&app.callee.id)
                        .ok_or_else(|| EvalError::UnboundFunction {
                            name: app.callee.display.clone(),
                            span: expr.span,
                        })?;
                let argument = self.eval(&app.argument, env)?;
                self.calls += 1;

                let body_env = def_env
                    .extend(Binding::Function(def, def_env.clone()))
                    .extend(Binding::Variable(&def.param.id, argument));
                self.eval(&def.body, &body_env)
            }
            ExprKind::LiftedCall(call) => {
                let function = *self.functions.get(call.callee.as_str()).ok_or_else(|| {
                    EvalError::UnboundFunction {
                        name: call.callee.clone(),
                        span: expr.span,
                    }
                })?;
                if function.arity() != call.arguments.len() {
                    return Err(EvalError::ArityMismatch {
                        name: call.callee.clone(),
                        expected: function.arity(),
                        got: call.arguments.len(),
                        span: expr.span,
                    });
                }

                let mut body_env = Env::default();
                for (param, argument) in function.params.iter().zip(&call.arguments) {
                    let value = self.eval(argument, env)?;
                    body_env = body_env.extend(Binding::Variable(&param.name, value));
                }
                self.calls += 1;
                self.eval(&function.body, &body_env)
            }
            ExprKind::Sequence(seq) => {
                self.eval(&seq.first, env)?;
                self.eval(&seq.second, env)
            }
            ExprKind::Binary(binary) => {
                let left = self.eval(&binary.left, env)?;
                let right = self.eval(&binary.right, env)?;
                apply(binary.op, left, right).ok_or(EvalError::OperandMismatch {
                    op: binary.op,
                    span: expr.span,
                })
            }
        }
    }
}

fn apply(op: BinaryOp, left: Value, right: Value) -> Option<Value> {
    use Value::{Bool, Num};
    Some(match (op, left, right) {
        (BinaryOp::Add, Num(a), Num(b)) => Num(a.wrapping_add(b)),
        (BinaryOp::Sub, Num(a), Num(b)) => Num(a.wrapping_sub(b)),
        (BinaryOp::Lt, Num(a), Num(b)) => Bool(a < b),
        (BinaryOp::Eq, Num(a), Num(b)) => Bool(a == b),
        (BinaryOp::Eq, Bool(a), Bool(b)) => Bool(a == b),
        _ => return None,
    })
}

/// Evaluate an expression tree.
pub fn evaluate(expr: &Expr) -> Result<Value, EvalError> {
    Evaluator::new().evaluate(expr)
}

/// Evaluate the main expression of a lifted program.
pub fn evaluate_program(program: &Program) -> Result<Value, EvalError> {
    Evaluator::for_program(program).evaluate(&program.main)
}
