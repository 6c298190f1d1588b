//! Instruction emitter for the code generator.
//!
//! The [`InstructionEmitter`] appends Trac42 instructions to a module while
//! tracking the compile-time stack depth relative to the frame pointer.
//! Knowing the depth lets the code generator place a new local at the
//! right negative offset even when temporaries are already on the stack.
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = InstructionEmitter::new();
//! emitter.emit_label("main")?;
//! emitter.push_int(40);
//! emitter.push_int(2);
//! emitter.emit(OpCode::Add);
//! emitter.emit(OpCode::End);
//! let module = emitter.finish();
//! ```

use lectlang_core::{InternalError, Type};
use rustc_hash::FxHashSet;

use crate::bytecode::{Instruction, Module, OpCode};

/// Emits instructions into a [`Module`].
#[derive(Debug, Default)]
pub struct InstructionEmitter {
    /// The module being built
    module: Module,

    /// Labels emitted so far
    labels: FxHashSet<String>,

    /// Words pushed since the frame pointer was set
    depth: i32,
}

impl InstructionEmitter {
    /// Create a new emitter with an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stack depth, in words below the frame pointer.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Reset the depth when a new frame starts.
    pub fn reset_depth(&mut self) {
        self.depth = 0;
    }

    /// Offset the next pushed word will occupy.
    pub fn next_slot_offset(&self) -> i32 {
        -(self.depth + 1)
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit an instruction without an operand.
    pub fn emit(&mut self, op: OpCode) {
        self.push(Instruction::new(op), 0);
    }

    /// Emit an instruction with an integer operand.
    pub fn emit_int(&mut self, op: OpCode, value: i32) {
        self.push(Instruction::with_int(op, value), value);
    }

    fn push(&mut self, instruction: Instruction, operand: i32) {
        self.depth += instruction.op.stack_effect(operand);
        tracing::trace!(depth = self.depth, "{}", instruction);
        self.module.push(instruction);
    }

    // ==========================================================================
    // Labels and Calls
    // ==========================================================================

    /// Emit a label. Label names are unique within a module.
    pub fn emit_label(&mut self, name: &str) -> Result<(), InternalError> {
        if !self.labels.insert(name.to_string()) {
            return Err(InternalError::DuplicateLabel {
                label: name.to_string(),
            });
        }
        self.push(Instruction::with_label(OpCode::Label, name), 0);
        Ok(())
    }

    /// Emit a call to a label.
    pub fn emit_call(&mut self, name: &str) {
        self.push(Instruction::with_label(OpCode::Bsr, name), 0);
    }

    // ==========================================================================
    // Typed Operations
    // ==========================================================================

    pub fn push_int(&mut self, value: i32) {
        self.emit_int(OpCode::PushInt, value);
    }

    pub fn push_bool(&mut self, value: bool) {
        self.emit_int(OpCode::PushBool, i32::from(value));
    }

    /// Push the address of a frame slot.
    pub fn emit_lval(&mut self, offset: i32) {
        self.emit_int(OpCode::Lval, offset);
    }

    /// Load a typed value from a frame slot.
    pub fn emit_load(&mut self, ty: Type, offset: i32) {
        let op = match ty {
            Type::Num => OpCode::RvalInt,
            Type::Bool => OpCode::RvalBool,
        };
        self.emit_int(op, offset);
    }

    /// Store the value on top of the stack through the address beneath it.
    pub fn emit_store(&mut self, ty: Type) {
        self.emit(match ty {
            Type::Num => OpCode::AssInt,
            Type::Bool => OpCode::AssBool,
        });
    }

    /// Reserve `count` words.
    pub fn emit_decl(&mut self, count: i32) {
        self.emit_int(OpCode::Decl, count);
    }

    /// Drop `count` words.
    pub fn emit_pop(&mut self, count: i32) {
        self.emit_int(OpCode::Pop, count);
    }

    /// Number of instructions emitted so far.
    pub fn len(&self) -> usize {
        self.module.len()
    }

    pub fn is_empty(&self) -> bool {
        self.module.is_empty()
    }

    /// Finish emission and return the module.
    pub fn finish(self) -> Module {
        self.module
    }
}
