//! Trac42 abstract machine.
//!
//! Executes a linked [`Module`] starting at its `main` label. Memory is a
//! word-addressed stack that grows downward from `stack_size`; `SP` points
//! at the top word and `FP` starts at the initial `SP`, so `main`'s locals
//! sit at `FP - 1`, `FP - 2`, ...
//!
//! Booleans are words: zero is false, anything else is true.

use lectlang_compiler::{Instruction, Module, OpCode, Operand};
use lectlang_core::MachineError;

/// Emulator limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Stack size in words
    pub stack_size: usize,
    /// Maximum number of executed instructions
    pub max_steps: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            stack_size: 4096,
            max_steps: 1_000_000,
        }
    }
}

/// The Trac42 machine state.
#[derive(Debug)]
pub struct Machine {
    config: MachineConfig,
    memory: Vec<i32>,
    sp: usize,
    fp: usize,
    pc: usize,
    steps: u64,
    output: Vec<i32>,
}

enum Flow {
    Next,
    Jump(usize),
    Halt,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Self {
        Self {
            config,
            memory: vec![0; config.stack_size],
            sp: config.stack_size,
            fp: config.stack_size,
            pc: 0,
            steps: 0,
            output: Vec::new(),
        }
    }

    /// Values written by `WRITEINT`, in order.
    pub fn output(&self) -> &[i32] {
        &self.output
    }

    /// Instructions executed by the last run.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Run `module` from its `main` label and return the top word at `END`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&mut self, module: &Module) -> Result<i32, MachineError> {
        self.reset();
        self.pc = module.entry_point().ok_or(MachineError::MissingEntryPoint)?;

        loop {
            if self.steps >= self.config.max_steps {
                return Err(MachineError::StepLimit {
                    limit: self.config.max_steps,
                });
            }
            self.steps += 1;

            let instruction = module
                .get(self.pc)
                .ok_or(MachineError::PcOutOfBounds { pc: self.pc })?;
            tracing::trace!(pc = self.pc, sp = self.sp, fp = self.fp, "{}", instruction);

            match self.step(instruction)? {
                Flow::Next => self.pc += 1,
                Flow::Jump(target) => self.pc = target,
                Flow::Halt => {
                    let result = self.peek()?;
                    tracing::debug!(result, steps = self.steps, "machine halted");
                    return Ok(result);
                }
            }
        }
    }

    fn reset(&mut self) {
        self.memory.fill(0);
        self.sp = self.config.stack_size;
        self.fp = self.config.stack_size;
        self.pc = 0;
        self.steps = 0;
        self.output.clear();
    }

    fn step(&mut self, instruction: &Instruction) -> Result<Flow, MachineError> {
        match instruction.op {
            OpCode::PushInt | OpCode::PushBool => {
                let value = self.int_operand(instruction)?;
                self.push(value)?;
            }
            OpCode::Lval => {
                let address = self.frame_address(instruction)?;
                self.push(address as i32)?;
            }
            OpCode::RvalInt | OpCode::RvalBool => {
                let address = self.frame_address(instruction)?;
                self.push(self.memory[address])?;
            }
            OpCode::AssInt | OpCode::AssBool => {
                let value = self.pop()?;
                let address = self.pop()?;
                let address = self.check_address(i64::from(address))?;
                self.memory[address] = value;
            }
            OpCode::Add => self.binary(|a, b| a.wrapping_add(b))?,
            OpCode::Sub => self.binary(|a, b| a.wrapping_sub(b))?,
            OpCode::EqInt => self.binary(|a, b| i32::from(a == b))?,
            OpCode::EqBool => self.binary(|a, b| i32::from((a != 0) == (b != 0)))?,
            OpCode::LtInt => self.binary(|a, b| i32::from(a < b))?,
            OpCode::Decl => {
                let count = self.count_operand(instruction)?;
                for _ in 0..count {
                    self.push(0)?;
                }
            }
            OpCode::Pop => {
                let count = self.count_operand(instruction)?;
                if self.sp + count > self.config.stack_size {
                    return Err(MachineError::StackUnderflow { pc: self.pc });
                }
                self.sp += count;
            }
            OpCode::Brf => {
                let target = self.target(instruction)?;
                if self.pop()? == 0 {
                    return Ok(Flow::Jump(target));
                }
            }
            OpCode::Bra => return Ok(Flow::Jump(self.target(instruction)?)),
            OpCode::WriteInt => {
                let value = self.pop()?;
                self.output.push(value);
            }
            OpCode::Link => {
                self.push(self.fp as i32)?;
                self.fp = self.sp;
            }
            OpCode::Unlink => {
                self.sp = self.fp;
                let saved = self.pop()?;
                self.fp = self.check_frame(saved)?;
            }
            OpCode::Bsr => {
                let target = self.target(instruction)?;
                self.push((self.pc + 1) as i32)?;
                return Ok(Flow::Jump(target));
            }
            OpCode::Rts => {
                let return_address = self.pop()?;
                let target = usize::try_from(return_address)
                    .map_err(|_| MachineError::PcOutOfBounds { pc: self.pc })?;
                return Ok(Flow::Jump(target));
            }
            OpCode::End => return Ok(Flow::Halt),
            OpCode::Label => {}
        }
        Ok(Flow::Next)
    }

    // ==========================================================================
    // Stack
    // ==========================================================================

    fn push(&mut self, value: i32) -> Result<(), MachineError> {
        if self.sp == 0 {
            return Err(MachineError::StackOverflow { pc: self.pc });
        }
        self.sp -= 1;
        self.memory[self.sp] = value;
        Ok(())
    }

    fn pop(&mut self) -> Result<i32, MachineError> {
        let value = self.peek()?;
        self.sp += 1;
        Ok(value)
    }

    fn peek(&self) -> Result<i32, MachineError> {
        self.memory
            .get(self.sp)
            .copied()
            .ok_or(MachineError::StackUnderflow { pc: self.pc })
    }

    fn binary(&mut self, op: impl Fn(i32, i32) -> i32) -> Result<(), MachineError> {
        let right = self.pop()?;
        let left = self.pop()?;
        self.push(op(left, right))
    }

    // ==========================================================================
    // Operands
    // ==========================================================================

    fn int_operand(&self, instruction: &Instruction) -> Result<i32, MachineError> {
        instruction
            .int()
            .ok_or(MachineError::MalformedInstruction { pc: self.pc })
    }

    fn count_operand(&self, instruction: &Instruction) -> Result<usize, MachineError> {
        usize::try_from(self.int_operand(instruction)?)
            .map_err(|_| MachineError::MalformedInstruction { pc: self.pc })
    }

    fn frame_address(&self, instruction: &Instruction) -> Result<usize, MachineError> {
        let offset = self.int_operand(instruction)?;
        self.check_address(self.fp as i64 + i64::from(offset))
    }

    fn check_address(&self, address: i64) -> Result<usize, MachineError> {
        usize::try_from(address)
            .ok()
            .filter(|&a| a < self.config.stack_size)
            .ok_or(MachineError::InvalidAddress {
                pc: self.pc,
                address,
            })
    }

    fn check_frame(&self, saved: i32) -> Result<usize, MachineError> {
        usize::try_from(saved)
            .ok()
            .filter(|&a| a <= self.config.stack_size)
            .ok_or(MachineError::InvalidAddress {
                pc: self.pc,
                address: i64::from(saved),
            })
    }

    fn target(&self, instruction: &Instruction) -> Result<usize, MachineError> {
        match &instruction.operand {
            Operand::Address(index) => Ok(*index),
            Operand::Label(label) => Err(MachineError::UnlinkedTarget {
                pc: self.pc,
                label: label.clone(),
            }),
            _ => Err(MachineError::MalformedInstruction { pc: self.pc }),
        }
    }
}

/// Run `module` on a machine with the default configuration.
pub fn execute(module: &Module) -> Result<i32, MachineError> {
    Machine::new(MachineConfig::default()).run(module)
}
