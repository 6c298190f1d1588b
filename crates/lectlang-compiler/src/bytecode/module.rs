//! Compiled module: the ordered instruction list of a whole program.

use std::fmt;

use super::{Instruction, OpCode};

/// Name of the label that marks program entry.
pub const MAIN_LABEL: &str = "main";

/// An ordered, 0-indexed sequence of instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    instructions: Vec<Instruction>,
}

impl Module {
    /// Create an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing instruction list.
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Append an instruction and return its index.
    pub fn push(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn instructions_mut(&mut self) -> &mut [Instruction] {
        &mut self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Index of the `LABEL` instruction with the given name.
    pub fn label_index(&self, name: &str) -> Option<usize> {
        self.instructions
            .iter()
            .position(|instr| instr.op == OpCode::Label && instr.label() == Some(name))
    }

    /// Index of the `main` label.
    pub fn entry_point(&self) -> Option<usize> {
        self.label_index(MAIN_LABEL)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{index}\t{instruction}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_has_index_and_tab() {
        let mut module = Module::new();
        module.push(Instruction::with_label(OpCode::Label, "main"));
        module.push(Instruction::with_int(OpCode::PushInt, 7));
        module.push(Instruction::new(OpCode::End));
        assert_eq!(module.to_string(), "0\tLABEL main\n1\tPUSHINT 7\n2\tEND\n");
    }

    #[test]
    fn finds_entry_point() {
        let module = Module::from_instructions(vec![
            Instruction::with_label(OpCode::Label, "f_0"),
            Instruction::new(OpCode::Rts),
            Instruction::with_label(OpCode::Label, "main"),
            Instruction::new(OpCode::End),
        ]);
        assert_eq!(module.entry_point(), Some(2));
        assert_eq!(module.label_index("f_0"), Some(0));
        assert_eq!(module.label_index("g_0"), None);
    }
}
