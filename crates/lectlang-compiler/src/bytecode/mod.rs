//! Trac42 instruction types.
//!
//! - [`OpCode`] - The Trac42 instruction set
//! - [`Instruction`] and [`Operand`] - One instruction with its operand
//! - [`Module`] - The instruction list of a compiled program

mod instruction;
mod module;
mod opcode;

pub use instruction::{Instruction, Operand};
pub use module::{MAIN_LABEL, Module};
pub use opcode::OpCode;
