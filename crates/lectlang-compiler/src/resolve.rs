//! Scope resolution with alpha-renaming.
//!
//! Every binding occurrence gets a program-wide unique identifier and every
//! use site is rewritten to the identifier of its nearest enclosing binder.
//! The k-th binding of `x` anywhere in the program becomes `x` (k = 0) or
//! `x_k` (k >= 1); the counter is shared by all scopes of one run. A
//! generated spelling that is also the name of some source binder is
//! skipped, so `let x_1 = ...` in the source cannot collide with a renamed
//! `x`.
//!
//! Resolution never fails. References with no binder are left as they are
//! for the type checker to report.

use lectlang_core::{Expr, ExprKind, Name};
use rustc_hash::{FxHashMap, FxHashSet};

/// Alpha-renaming pass.
#[derive(Debug, Default)]
pub struct ScopeResolver {
    /// Innermost scope last; original name to renamed name
    scopes: Vec<FxHashMap<String, String>>,

    /// Bindings seen so far, per original name
    counters: FxHashMap<String, u32>,

    /// Original names of every binder in the program
    reserved: FxHashSet<String>,

    /// Number of bindings that received a new spelling
    renamed: usize,
}

impl ScopeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `expr` in place.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(&mut self, expr: &mut Expr) {
        collect_binders(expr, &mut self.reserved);
        self.resolve_expr(expr);
        tracing::debug!(
            binders = self.reserved.len(),
            renamed = self.renamed,
            "scope resolution complete"
        );
    }

    /// Number of bindings renamed during the last run.
    pub fn renamed_count(&self) -> usize {
        self.renamed
    }

    fn resolve_expr(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Let(let_expr) => {
                self.resolve_expr(&mut let_expr.value);
                self.push_scope();
                self.bind(&mut let_expr.name);
                self.resolve_expr(&mut let_expr.body);
                self.pop_scope();
            }
            ExprKind::LetRec(def) => {
                self.push_scope();
                self.bind(&mut def.name);

                self.push_scope();
                self.bind(&mut def.param);
                self.resolve_expr(&mut def.body);
                self.pop_scope();

                self.resolve_expr(&mut def.recipient);
                self.pop_scope();
            }
            ExprKind::Application(app) => {
                self.rename_use(&mut app.callee);
                self.resolve_expr(&mut app.argument);
            }
            ExprKind::LiftedCall(call) => {
                for argument in &mut call.arguments {
                    self.resolve_expr(argument);
                }
            }
            ExprKind::Sequence(seq) => {
                self.resolve_expr(&mut seq.first);
                self.resolve_expr(&mut seq.second);
            }
            ExprKind::Binary(binary) => {
                self.resolve_expr(&mut binary.left);
                self.resolve_expr(&mut binary.right);
            }
            ExprKind::Variable(name) => self.rename_use(name),
            ExprKind::Number(_) | ExprKind::Bool(_) => {}
        }
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Give a binder its unique spelling and make it visible.
    fn bind(&mut self, name: &mut Name) {
        let fresh = self.fresh_name(&name.display);
        if fresh != name.display {
            self.renamed += 1;
            tracing::trace!(from = %name.display, to = %fresh, "renamed binding");
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.display.clone(), fresh.clone());
        }
        name.id = fresh;
    }

    fn fresh_name(&mut self, original: &str) -> String {
        let counter = self.counters.entry(original.to_string()).or_insert(0);
        loop {
            let k = *counter;
            *counter += 1;
            if k == 0 {
                return original.to_string();
            }
            let candidate = format!("{original}_{k}");
            if !self.reserved.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Point a use site at its nearest enclosing binder.
    fn rename_use(&self, name: &mut Name) {
        let resolved = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name.display));
        if let Some(resolved) = resolved {
            name.id = resolved.clone();
        }
    }
}

/// Record the original name of every binder in `expr`.
fn collect_binders(expr: &Expr, out: &mut FxHashSet<String>) {
    match &expr.kind {
        ExprKind::Let(let_expr) => {
            out.insert(let_expr.name.display.clone());
        }
        ExprKind::LetRec(def) => {
            out.insert(def.name.display.clone());
            out.insert(def.param.display.clone());
        }
        _ => {}
    }
    for child in expr.children() {
        collect_binders(child, out);
    }
}

/// Resolve `expr` in place with a fresh resolver.
pub fn resolve(expr: &mut Expr) {
    ScopeResolver::new().resolve(expr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectlang_core::{BinaryOp, Span, Type};

    fn sp() -> Span {
        Span::point(1, 1)
    }

    fn var(name: &str) -> Expr {
        Expr::variable(name, sp())
    }

    fn num(n: i32) -> Expr {
        Expr::number(n, sp())
    }

    fn add(l: Expr, r: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, l, r, sp())
    }

    fn let_parts(expr: &Expr) -> (&Name, &Expr, &Expr) {
        match &expr.kind {
            ExprKind::Let(l) => (&l.name, &l.value, &l.body),
            other => panic!("expected let, got {other:?}"),
        }
    }

    fn var_id(expr: &Expr) -> &str {
        match &expr.kind {
            ExprKind::Variable(name) => &name.id,
            other => panic!("expected variable, got {other:?}"),
        }
    }

    #[test]
    fn single_binding_is_unchanged() {
        let mut expr = Expr::let_in("x", num(1), add(var("x"), num(1)), sp());
        let original = expr.clone();
        resolve(&mut expr);
        assert_eq!(expr, original);
    }

    #[test]
    fn shadowing_renames_inner_binding() {
        // let x = 1 in (let x = 2 in x) + x
        let inner = Expr::let_in("x", num(2), var("x"), sp());
        let mut expr = Expr::let_in("x", num(1), add(inner, var("x")), sp());
        resolve(&mut expr);

        let (outer_name, _, body) = let_parts(&expr);
        assert_eq!(outer_name.id, "x");
        let ExprKind::Binary(sum) = &body.kind else {
            panic!("expected binary");
        };
        let (inner_name, _, inner_body) = let_parts(&sum.left);
        assert_eq!(inner_name.id, "x_1");
        assert_eq!(inner_name.display, "x");
        assert_eq!(var_id(inner_body), "x_1");
        assert_eq!(var_id(&sum.right), "x");
    }

    #[test]
    fn bound_expression_sees_outer_binding() {
        // let x = 1 in let x = x + 1 in x
        let inner = Expr::let_in("x", add(var("x"), num(1)), var("x"), sp());
        let mut expr = Expr::let_in("x", num(1), inner, sp());
        resolve(&mut expr);

        let (_, _, body) = let_parts(&expr);
        let (inner_name, value, inner_body) = let_parts(body);
        assert_eq!(inner_name.id, "x_1");
        let ExprKind::Binary(sum) = &value.kind else {
            panic!("expected binary");
        };
        assert_eq!(var_id(&sum.left), "x");
        assert_eq!(var_id(inner_body), "x_1");
    }

    #[test]
    fn function_is_visible_in_its_body_and_recipient() {
        // let f x : num -> num = f x in let x = 5 in f x
        let body = Expr::application("f", var("x"), sp());
        let recipient = Expr::let_in("x", num(5), Expr::application("f", var("x"), sp()), sp());
        let mut expr = Expr::let_rec("f", "x", Type::Num, Type::Num, body, recipient, sp());
        resolve(&mut expr);

        let ExprKind::LetRec(def) = &expr.kind else {
            panic!("expected let rec");
        };
        assert_eq!(def.name.id, "f");
        assert_eq!(def.param.id, "x");
        let ExprKind::Application(rec_call) = &def.body.kind else {
            panic!("expected application");
        };
        assert_eq!(rec_call.callee.id, "f");
        assert_eq!(var_id(&rec_call.argument), "x");

        let (x_name, _, call) = let_parts(&def.recipient);
        assert_eq!(x_name.id, "x_1");
        let ExprKind::Application(outer_call) = &call.kind else {
            panic!("expected application");
        };
        assert_eq!(var_id(&outer_call.argument), "x_1");
    }

    #[test]
    fn counter_is_shared_across_sibling_scopes() {
        // (let y = 1 in y), (let y = 2 in y)
        let mut expr = Expr::sequence(
            Expr::let_in("y", num(1), var("y"), sp()),
            Expr::let_in("y", num(2), var("y"), sp()),
            sp(),
        );
        resolve(&mut expr);
        let ExprKind::Sequence(seq) = &expr.kind else {
            panic!("expected sequence");
        };
        assert_eq!(let_parts(&seq.first).0.id, "y");
        assert_eq!(let_parts(&seq.second).0.id, "y_1");
    }

    #[test]
    fn generated_names_avoid_source_binders() {
        // let x = 1 in let x = 2 in let x_1 = 3 in x + x_1
        let innermost = Expr::let_in("x_1", num(3), add(var("x"), var("x_1")), sp());
        let middle = Expr::let_in("x", num(2), innermost, sp());
        let mut expr = Expr::let_in("x", num(1), middle, sp());
        resolve(&mut expr);

        let (a, _, rest) = let_parts(&expr);
        let (b, _, rest) = let_parts(rest);
        let (c, _, body) = let_parts(rest);
        assert_eq!(a.id, "x");
        assert_eq!(b.id, "x_2");
        assert_eq!(c.id, "x_1");
        let ExprKind::Binary(sum) = &body.kind else {
            panic!("expected binary");
        };
        assert_eq!(var_id(&sum.left), "x_2");
        assert_eq!(var_id(&sum.right), "x_1");
    }

    #[test]
    fn unbound_reference_is_left_alone() {
        let mut expr = add(var("y"), num(1));
        let original = expr.clone();
        resolve(&mut expr);
        assert_eq!(expr, original);
    }

    #[test]
    fn renamed_count_reports_new_spellings() {
        let inner = Expr::let_in("x", num(2), var("x"), sp());
        let mut expr = Expr::let_in("x", num(1), inner, sp());
        let mut resolver = ScopeResolver::new();
        resolver.resolve(&mut expr);
        assert_eq!(resolver.renamed_count(), 1);
    }
}
