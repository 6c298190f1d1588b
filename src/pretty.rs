//! Pretty-printer for expression trees and lifted programs.
//!
//! Output uses the concrete syntax the parser accepts, with parentheses
//! only where precedence or associativity requires them. Lifted
//! functions print as `let name a b c = body` and lifted calls as
//! `name a b`; those two forms are for reading, not for reparsing.

use std::fmt;

use lectlang_core::{BinaryOp, Expr, ExprKind, LiftedFunction, Name, Param, Program};

const SEQUENCE: u8 = 0;
const LET: u8 = 1;
const CALL: u8 = 4;
const ATOM: u8 = 5;

/// Which spelling of a name to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameMode {
    /// Names after scope resolution (`x_1`)
    #[default]
    Resolved,
    /// Names as written in source (`x`)
    Display,
}

impl NameMode {
    fn name<'a>(&self, name: &'a Name) -> &'a str {
        match self {
            NameMode::Resolved => &name.id,
            NameMode::Display => &name.display,
        }
    }

    fn param<'a>(&self, param: &'a Param) -> &'a str {
        match self {
            NameMode::Resolved => &param.name,
            NameMode::Display => &param.display,
        }
    }
}

/// [`fmt::Display`] adapter for an expression.
#[derive(Debug, Clone, Copy)]
pub struct PrettyExpr<'a> {
    expr: &'a Expr,
    mode: NameMode,
}

impl<'a> PrettyExpr<'a> {
    pub fn new(expr: &'a Expr, mode: NameMode) -> Self {
        Self { expr, mode }
    }
}

impl fmt::Display for PrettyExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self.expr, SEQUENCE, self.mode)
    }
}

/// [`fmt::Display`] adapter for a lifted program: one line per function,
/// then the main expression.
#[derive(Debug, Clone, Copy)]
pub struct PrettyProgram<'a> {
    program: &'a Program,
    mode: NameMode,
}

impl<'a> PrettyProgram<'a> {
    pub fn new(program: &'a Program, mode: NameMode) -> Self {
        Self { program, mode }
    }
}

impl fmt::Display for PrettyProgram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in &self.program.functions {
            write_function(f, function, self.mode)?;
            writeln!(f)?;
        }
        write_expr(f, &self.program.main, SEQUENCE, self.mode)
    }
}

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Sequence(_) => SEQUENCE,
        ExprKind::Let(_) | ExprKind::LetRec(_) => LET,
        ExprKind::Binary(binary) => binary.op.precedence(),
        ExprKind::Application(_) | ExprKind::LiftedCall(_) => CALL,
        ExprKind::Variable(_) | ExprKind::Number(_) | ExprKind::Bool(_) => ATOM,
    }
}

fn write_function(
    f: &mut fmt::Formatter<'_>,
    function: &LiftedFunction,
    mode: NameMode,
) -> fmt::Result {
    write!(f, "let {}", function.name)?;
    for param in &function.params {
        write!(f, " {}", mode.param(param))?;
    }
    f.write_str(" = ")?;
    write_expr(f, &function.body, LET, mode)
}

/// Write `expr` in a context that binds at least as tightly as `context`.
fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, context: u8, mode: NameMode) -> fmt::Result {
    let parenthesize = precedence(expr) < context;
    if parenthesize {
        f.write_str("(")?;
    }

    match &expr.kind {
        ExprKind::Number(n) => write!(f, "{n}")?,
        ExprKind::Bool(b) => write!(f, "{b}")?,
        ExprKind::Variable(name) => f.write_str(mode.name(name))?,
        ExprKind::Sequence(seq) => {
            write_expr(f, &seq.first, LET, mode)?;
            f.write_str(", ")?;
            write_expr(f, &seq.second, SEQUENCE, mode)?;
        }
        ExprKind::Let(let_expr) => {
            write!(f, "let {} = ", mode.name(&let_expr.name))?;
            write_expr(f, &let_expr.value, LET, mode)?;
            f.write_str(" in ")?;
            write_expr(f, &let_expr.body, LET, mode)?;
        }
        ExprKind::LetRec(def) => {
            write!(
                f,
                "let {} {} : {} -> {} = ",
                mode.name(&def.name),
                mode.name(&def.param),
                def.param_type,
                def.return_type
            )?;
            write_expr(f, &def.body, LET, mode)?;
            f.write_str(" in ")?;
            write_expr(f, &def.recipient, LET, mode)?;
        }
        ExprKind::Application(app) => {
            write!(f, "{} ", mode.name(&app.callee))?;
            write_expr(f, &app.argument, ATOM, mode)?;
        }
        ExprKind::LiftedCall(call) => {
            f.write_str(&call.callee)?;
            for argument in &call.arguments {
                f.write_str(" ")?;
                write_expr(f, argument, ATOM, mode)?;
            }
        }
        ExprKind::Binary(binary) => {
            let own = binary.op.precedence();
            write_expr(f, &binary.left, own, mode)?;
            write!(f, " {} ", binary.op)?;
            write_expr(f, &binary.right, right_context(binary.op, &binary.right), mode)?;
        }
    }

    if parenthesize {
        f.write_str(")")?;
    }
    Ok(())
}

/// Equal-precedence right operands need parentheses, except `+` under `+`.
fn right_context(op: BinaryOp, right: &Expr) -> u8 {
    let own = op.precedence();
    match &right.kind {
        ExprKind::Binary(inner) if op == BinaryOp::Add && inner.op == BinaryOp::Add => own,
        _ => own + 1,
    }
}

/// Render an expression with resolved names.
pub fn pretty(expr: &Expr) -> String {
    PrettyExpr::new(expr, NameMode::Resolved).to_string()
}

/// Render an expression with source names.
pub fn pretty_source(expr: &Expr) -> String {
    PrettyExpr::new(expr, NameMode::Display).to_string()
}

/// Render a lifted program with resolved names.
pub fn pretty_program(program: &Program) -> String {
    PrettyProgram::new(program, NameMode::Resolved).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reprint(source: &str) -> String {
        pretty(&lectlang_parser::parse(source).unwrap())
    }

    #[test]
    fn canonical_sources_print_unchanged() {
        for source in [
            "1 + 2 + 3",
            "1 - (2 - 3)",
            "1 - 2 - 3",
            "let x = 1 in x + 1",
            "let f x : num -> num = x + 2 in f 3",
            "f (g 1)",
            "1, 2, 3",
            "(1, 2), 3",
            "(let y = 2 in y) + 1",
            "1 + 2 == 3",
            "1 == (2 == true)",
            "let x = (1, 2) in x",
        ] {
            assert_eq!(reprint(source), source);
        }
    }

    #[test]
    fn redundant_parentheses_are_dropped() {
        assert_eq!(reprint("(1 + 2) + 3"), "1 + 2 + 3");
        assert_eq!(reprint("((x))"), "x");
        assert_eq!(reprint("f (3)"), "f 3");
        assert_eq!(reprint("(1 == 2) == true"), "1 == 2 == true");
        assert_eq!(reprint("(let x = 1 in x), 2"), "let x = 1 in x, 2");
    }

    #[test]
    fn trailing_let_operand_is_parenthesized() {
        assert_eq!(reprint("1 + let y = 2 in y"), "1 + (let y = 2 in y)");
    }

    #[test]
    fn output_reparses_to_the_same_tree() {
        let source = "let f x : num -> num = let g z : num -> num = z + x + 2 in g 15 \
                      in let x = 5 in f x == 8";
        let tree = lectlang_parser::parse(source).unwrap();
        let reparsed = lectlang_parser::parse(&pretty(&tree)).unwrap();
        assert_eq!(pretty(&reparsed), pretty(&tree));
    }

    #[test]
    fn name_modes() {
        let mut tree = lectlang_parser::parse("let x = 1 in (let x = 2 in x) + x").unwrap();
        lectlang_compiler::resolve(&mut tree);
        assert_eq!(pretty(&tree), "let x = 1 in (let x_1 = 2 in x_1) + x");
        assert_eq!(pretty_source(&tree), "let x = 1 in (let x = 2 in x) + x");
    }

    #[test]
    fn lifted_program_layout() {
        let mut tree = lectlang_parser::parse(
            "let f x : num -> num = let g z : num -> num = z + x + 2 in g 15 \
             in let x = 5 in f x == 8",
        )
        .unwrap();
        lectlang_compiler::resolve(&mut tree);
        lectlang_compiler::typecheck(&mut tree).unwrap();
        let program = lectlang_compiler::lift(tree).unwrap();
        assert_eq!(
            pretty_program(&program),
            "let g_0 z x = z + x + 2\n\
             let f_0 x = g_0 15 x\n\
             let x_1 = 5 in f_0 x_1 == 8"
        );
    }
}
