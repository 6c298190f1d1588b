//! Free-variable analysis.
//!
//! Computes the variables an expression references without binding them.
//! The walk carries a bound set (entered and left with the binders) and an
//! output set that only grows. Results keep first-encounter order so the
//! lambda lifter can use them directly as a parameter list.
//!
//! A [`CalleeCaptures`] hook lets a caller report the captures of
//! functions that are called but not defined inside the analysed
//! expression. Calling such a function needs its captures, so they count
//! as free at the call site.

use lectlang_core::{Expr, ExprKind, Name, Type};
use rustc_hash::FxHashMap;

/// A free variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeVar {
    /// Resolved name
    pub name: String,
    /// Name as written in source
    pub display: String,
    /// Checked type of the first occurrence, if the tree was type checked
    pub ty: Option<Type>,
}

/// An insertion-ordered set of free variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeVariables {
    vars: Vec<FreeVar>,
}

impl FreeVariables {
    /// Add a variable unless one with the same name is already present.
    pub fn insert(&mut self, var: FreeVar) -> bool {
        if self.contains(&var.name) {
            return false;
        }
        self.vars.push(var);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.iter().any(|v| v.name == name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FreeVar> {
        self.vars.iter()
    }

    /// Resolved names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.vars.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<FreeVar> {
        self.vars
    }
}

impl IntoIterator for FreeVariables {
    type Item = FreeVar;
    type IntoIter = std::vec::IntoIter<FreeVar>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

/// Captures of functions defined outside the analysed expression.
pub trait CalleeCaptures {
    /// The captures a call to `callee` must pass, if `callee` is known.
    fn captures_of(&self, callee: &str) -> Option<&[FreeVar]>;
}

/// No outside functions.
impl CalleeCaptures for () {
    fn captures_of(&self, _callee: &str) -> Option<&[FreeVar]> {
        None
    }
}

/// Free-variable analysis over one expression.
pub struct FreeVariableAnalyzer<'a, C: CalleeCaptures + ?Sized> {
    /// Binders currently in scope, with nesting counts
    bound: FxHashMap<String, u32>,

    /// Accumulated result
    free: FreeVariables,

    callees: &'a C,
}

impl<'a, C: CalleeCaptures + ?Sized> FreeVariableAnalyzer<'a, C> {
    pub fn new(callees: &'a C) -> Self {
        Self {
            bound: FxHashMap::default(),
            free: FreeVariables::default(),
            callees,
        }
    }

    /// Treat `names` as bound for the whole analysis.
    pub fn with_bound<'n>(mut self, names: impl IntoIterator<Item = &'n str>) -> Self {
        for name in names {
            self.bind(name);
        }
        self
    }

    /// Analyse `expr` and return its free variables.
    pub fn analyze(mut self, expr: &Expr) -> FreeVariables {
        self.visit(expr);
        self.free
    }

    fn bind(&mut self, name: &str) {
        *self.bound.entry(name.to_string()).or_insert(0) += 1;
    }

    fn unbind(&mut self, name: &str) {
        if let Some(count) = self.bound.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                self.bound.remove(name);
            }
        }
    }

    fn reference(&mut self, name: &Name, ty: Option<Type>) {
        if !self.bound.contains_key(&name.id) {
            self.free.insert(FreeVar {
                name: name.id.clone(),
                display: name.display.clone(),
                ty,
            });
        }
    }

    fn visit(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Let(let_expr) => {
                self.visit(&let_expr.value);
                self.bind(&let_expr.name.id);
                self.visit(&let_expr.body);
                self.unbind(&let_expr.name.id);
            }
            ExprKind::LetRec(def) => {
                self.bind(&def.name.id);

                self.bind(&def.param.id);
                self.visit(&def.body);
                self.unbind(&def.param.id);

                self.visit(&def.recipient);
                self.unbind(&def.name.id);
            }
            ExprKind::Application(app) => {
                let callees = self.callees;
                if let Some(captures) = callees.captures_of(&app.callee.id) {
                    for capture in captures {
                        if !self.bound.contains_key(&capture.name) {
                            self.free.insert(capture.clone());
                        }
                    }
                }
                self.visit(&app.argument);
            }
            ExprKind::Variable(name) => self.reference(name, expr.ty),
            _ => {
                for child in expr.children() {
                    self.visit(child);
                }
            }
        }
    }
}

/// Free variables of `expr`, with no outside functions.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn free_variables(expr: &Expr) -> FreeVariables {
    FreeVariableAnalyzer::new(&()).analyze(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectlang_core::{BinaryOp, Span};

    fn sp() -> Span {
        Span::point(1, 1)
    }

    fn var(name: &str) -> Expr {
        Expr::variable(name, sp())
    }

    fn add(l: Expr, r: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, l, r, sp())
    }

    #[test]
    fn let_binds_only_its_body() {
        // let x = 1 in x + y
        let expr = Expr::let_in("x", Expr::number(1, sp()), add(var("x"), var("y")), sp());
        assert_eq!(free_variables(&expr).names(), ["y"]);
    }

    #[test]
    fn let_value_does_not_see_its_own_name() {
        // let x = x in x
        let expr = Expr::let_in("x", var("x"), var("x"), sp());
        assert_eq!(free_variables(&expr).names(), ["x"]);
    }

    #[test]
    fn function_binds_name_and_param_in_body() {
        // let f x : num -> num = f (x + z) in f w
        let body = Expr::application("f", add(var("x"), var("z")), sp());
        let recipient = Expr::application("f", var("w"), sp());
        let expr = Expr::let_rec(
            "f",
            "x",
            lectlang_core::Type::Num,
            lectlang_core::Type::Num,
            body,
            recipient,
            sp(),
        );
        assert_eq!(free_variables(&expr).names(), ["z", "w"]);
    }

    #[test]
    fn param_is_not_bound_in_recipient() {
        let expr = Expr::let_rec(
            "f",
            "x",
            lectlang_core::Type::Num,
            lectlang_core::Type::Num,
            var("x"),
            var("x"),
            sp(),
        );
        assert_eq!(free_variables(&expr).names(), ["x"]);
    }

    #[test]
    fn first_encounter_order_without_duplicates() {
        let expr = add(add(var("b"), var("a")), add(var("b"), var("c")));
        assert_eq!(free_variables(&expr).names(), ["b", "a", "c"]);
    }

    #[test]
    fn closed_expression_has_no_free_variables() {
        // let x = 1 in (let x_1 = 2 in x_1) + x
        let inner = Expr::let_in("x_1", Expr::number(2, sp()), var("x_1"), sp());
        let expr = Expr::let_in("x", Expr::number(1, sp()), add(inner, var("x")), sp());
        assert!(free_variables(&expr).is_empty());
    }

    #[test]
    fn free_variable_keeps_checked_type() {
        let expr = var("y").with_type(lectlang_core::Type::Bool);
        let free = free_variables(&expr);
        assert_eq!(
            free.iter().next().map(|v| v.ty),
            Some(Some(lectlang_core::Type::Bool))
        );
    }

    #[test]
    fn with_bound_excludes_names() {
        let expr = add(var("f"), var("x"));
        let free = FreeVariableAnalyzer::new(&()).with_bound(["x"]).analyze(&expr);
        assert_eq!(free.names(), ["f"]);
    }

    struct Known(Vec<FreeVar>);

    impl CalleeCaptures for Known {
        fn captures_of(&self, callee: &str) -> Option<&[FreeVar]> {
            (callee == "g").then_some(self.0.as_slice())
        }
    }

    #[test]
    fn calls_contribute_callee_captures() {
        let known = Known(vec![FreeVar {
            name: "k".to_string(),
            display: "k".to_string(),
            ty: None,
        }]);
        let expr = Expr::application("g", var("a"), sp());
        let free = FreeVariableAnalyzer::new(&known).analyze(&expr);
        assert_eq!(free.names(), ["k", "a"]);
    }

    #[test]
    fn bound_callee_captures_are_not_free() {
        let known = Known(vec![FreeVar {
            name: "k".to_string(),
            display: "k".to_string(),
            ty: None,
        }]);
        let expr = Expr::let_in(
            "k",
            Expr::number(1, sp()),
            Expr::application("g", Expr::number(2, sp()), sp()),
            sp(),
        );
        assert!(FreeVariableAnalyzer::new(&known).analyze(&expr).is_empty());
    }
}
