//! Label resolution.
//!
//! The linker collects the index of every `LABEL` instruction, then
//! replaces the symbolic operand of each `BSR`, `BRA` and `BRF` with the
//! absolute index of its target. `LABEL` instructions stay in place and
//! keep their names.

use lectlang_core::InternalError;
use rustc_hash::FxHashMap;

use crate::bytecode::{Module, OpCode, Operand};

/// Label-to-address resolver for one module.
#[derive(Debug, Default)]
pub struct Linker {
    labels: FxHashMap<String, usize>,
}

impl Linker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every control transfer in `module` in place.
    ///
    /// Returns the number of rewritten instructions. On error the module
    /// may be partially rewritten.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn link(mut self, module: &mut Module) -> Result<usize, InternalError> {
        self.collect_labels(module)?;

        let mut rewritten = 0;
        for instruction in module.instructions_mut() {
            if !instruction.op.is_control_transfer() {
                continue;
            }
            let Operand::Label(label) = &instruction.operand else {
                continue;
            };
            let address = *self
                .labels
                .get(label)
                .ok_or_else(|| InternalError::UnresolvedLabel {
                    label: label.clone(),
                })?;
            instruction.operand = Operand::Address(address);
            rewritten += 1;
        }

        tracing::debug!(labels = self.labels.len(), rewritten, "linking complete");
        Ok(rewritten)
    }

    fn collect_labels(&mut self, module: &Module) -> Result<(), InternalError> {
        for (index, instruction) in module.instructions().iter().enumerate() {
            if instruction.op != OpCode::Label {
                continue;
            }
            let Some(name) = instruction.label() else {
                continue;
            };
            if self.labels.insert(name.to_string(), index).is_some() {
                return Err(InternalError::DuplicateLabel {
                    label: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Link `module` in place with a fresh linker.
pub fn link(module: &mut Module) -> Result<usize, InternalError> {
    Linker::new().link(module)
}
