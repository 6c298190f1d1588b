//! Trac42 operation codes.
//!
//! The Trac42 machine is a word-addressed stack machine with a frame
//! pointer. Every instruction carries at most one operand.

use std::fmt;

/// Trac42 operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // =========================================================================
    // Constants
    // =========================================================================
    /// Push an integer literal.
    /// Operand: literal value
    PushInt,
    /// Push a boolean literal (0 or 1).
    /// Operand: literal value
    PushBool,

    // =========================================================================
    // Frame-Relative Access
    // =========================================================================
    /// Push the address `FP + n`.
    /// Operand: frame offset
    Lval,
    /// Push the integer stored at `FP + n`.
    /// Operand: frame offset
    RvalInt,
    /// Push the boolean stored at `FP + n`.
    /// Operand: frame offset
    RvalBool,
    /// Pop an integer value and an address, store the value.
    AssInt,
    /// Pop a boolean value and an address, store the value.
    AssBool,

    // =========================================================================
    // Arithmetic and Comparison
    // =========================================================================
    /// Pop two integers, push their sum.
    Add,
    /// Pop two integers, push their difference.
    Sub,
    /// Pop two booleans, push whether they are equal.
    EqBool,
    /// Pop two integers, push whether they are equal.
    EqInt,
    /// Pop two integers, push whether the first is less than the second.
    LtInt,

    // =========================================================================
    // Stack Management
    // =========================================================================
    /// Reserve stack words.
    /// Operand: word count
    Decl,
    /// Drop stack words.
    /// Operand: word count
    Pop,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Pop a boolean, branch if false.
    /// Operand: target
    Brf,
    /// Branch unconditionally.
    /// Operand: target
    Bra,
    /// Pop an integer and write it to the output.
    WriteInt,
    /// Push the frame pointer and point it at the new top of stack.
    Link,
    /// Restore the stack and frame pointers saved by `Link`.
    Unlink,
    /// Return to the address on top of the stack.
    Rts,
    /// Push the return address and branch to a subroutine.
    /// Operand: target
    Bsr,
    /// Halt the machine.
    End,
    /// Marks a branch or call target. Not executed.
    /// Operand: label name
    Label,
}

impl OpCode {
    /// Mnemonic as printed in module listings.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::PushInt => "PUSHINT",
            OpCode::PushBool => "PUSHBOOL",
            OpCode::Lval => "LVAL",
            OpCode::RvalInt => "RVALINT",
            OpCode::RvalBool => "RVALBOOL",
            OpCode::AssInt => "ASSINT",
            OpCode::AssBool => "ASSBOOL",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::EqBool => "EQBOOL",
            OpCode::EqInt => "EQINT",
            OpCode::LtInt => "LTINT",
            OpCode::Decl => "DECL",
            OpCode::Pop => "POP",
            OpCode::Brf => "BRF",
            OpCode::Bra => "BRA",
            OpCode::WriteInt => "WRITEINT",
            OpCode::Link => "LINK",
            OpCode::Unlink => "UNLINK",
            OpCode::Rts => "RTS",
            OpCode::Bsr => "BSR",
            OpCode::End => "END",
            OpCode::Label => "LABEL",
        }
    }

    /// Whether the operand is a frame offset (rendered with an `(FP)` suffix).
    pub fn is_frame_relative(&self) -> bool {
        matches!(self, OpCode::Lval | OpCode::RvalInt | OpCode::RvalBool)
    }

    /// Whether the operand is a symbolic target resolved by the linker.
    pub fn is_control_transfer(&self) -> bool {
        matches!(self, OpCode::Bsr | OpCode::Brf | OpCode::Bra)
    }

    /// Net change in stack depth, in words, for an operand of `n`.
    ///
    /// Calls and returns are balanced at the caller: `BSR` and `RTS` leave
    /// the caller's depth unchanged, as do `LINK`/`UNLINK` from the
    /// callee's point of view.
    pub fn stack_effect(&self, n: i32) -> i32 {
        match self {
            OpCode::PushInt | OpCode::PushBool => 1,
            OpCode::Lval | OpCode::RvalInt | OpCode::RvalBool => 1,
            OpCode::AssInt | OpCode::AssBool => -2,
            OpCode::Add | OpCode::Sub | OpCode::EqBool | OpCode::EqInt | OpCode::LtInt => -1,
            OpCode::Decl => n,
            OpCode::Pop => -n,
            OpCode::Brf | OpCode::WriteInt => -1,
            OpCode::Bra
            | OpCode::Link
            | OpCode::Unlink
            | OpCode::Rts
            | OpCode::Bsr
            | OpCode::End
            | OpCode::Label => 0,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
