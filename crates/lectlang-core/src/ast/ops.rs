//! Binary operator definitions.
//!
//! Provides [`BinaryOp`] along with the precedence and associativity used
//! by the parser and the pretty-printer.

use std::fmt;

/// Binary operators, organized by precedence from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Comparison (precedence 2)
    /// `==` on two operands of the same type
    Eq,
    /// `<` on numbers
    Lt,

    // Additive (precedence 3)
    /// `+`
    Add,
    /// `-`
    Sub,
}

/// How operands of equal precedence group without parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a - b - c` is `(a - b) - c`.
    Left,
    /// `a + b + c` means the same either way.
    Both,
}

impl BinaryOp {
    /// Precedence level; higher binds more tightly.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Eq | BinaryOp::Lt => 2,
            BinaryOp::Add | BinaryOp::Sub => 3,
        }
    }

    /// Associativity of the operator.
    pub fn associativity(&self) -> Associativity {
        match self {
            BinaryOp::Add => Associativity::Both,
            BinaryOp::Sub | BinaryOp::Eq | BinaryOp::Lt => Associativity::Left,
        }
    }

    /// Get the binding power for the Pratt parser.
    ///
    /// Returns (left_bp, right_bp). All operators are left-associative
    /// in the grammar, so right_bp = left_bp + 1.
    pub fn binding_power(&self) -> (u8, u8) {
        let bp = self.precedence() * 2;
        (bp, bp + 1)
    }

    /// Source form of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Lt => "<",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
