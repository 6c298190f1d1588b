//! A single Trac42 instruction and its operand.

use std::fmt;

use super::OpCode;

/// Instruction operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// No operand.
    None,
    /// Literal value, word count, or frame offset.
    Int(i32),
    /// Symbolic target (or the name carried by a `LABEL`).
    Label(String),
    /// Absolute instruction index, after linking.
    Address(usize),
}

/// One instruction of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub op: OpCode,
    pub operand: Operand,
}

impl Instruction {
    /// Instruction without an operand.
    pub fn new(op: OpCode) -> Self {
        Self {
            op,
            operand: Operand::None,
        }
    }

    /// Instruction with an integer operand.
    pub fn with_int(op: OpCode, value: i32) -> Self {
        Self {
            op,
            operand: Operand::Int(value),
        }
    }

    /// Instruction with a symbolic target.
    pub fn with_label(op: OpCode, label: impl Into<String>) -> Self {
        Self {
            op,
            operand: Operand::Label(label.into()),
        }
    }

    /// The label name, if the operand is still symbolic.
    pub fn label(&self) -> Option<&str> {
        match &self.operand {
            Operand::Label(name) => Some(name),
            _ => None,
        }
    }

    /// The integer operand, if any.
    pub fn int(&self) -> Option<i32> {
        match self.operand {
            Operand::Int(value) => Some(value),
            _ => None,
        }
    }

    /// The resolved target, if linked.
    pub fn address(&self) -> Option<usize> {
        match self.operand {
            Operand::Address(index) => Some(index),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op.name())?;
        match &self.operand {
            Operand::None => Ok(()),
            Operand::Int(value) if self.op.is_frame_relative() => write!(f, " {value}(FP)"),
            Operand::Int(value) => write!(f, " {value}"),
            Operand::Label(name) => write!(f, " {name}"),
            Operand::Address(index) => write!(f, " {index}"),
        }
    }
}
