//! Frame layout for code generation.
//!
//! [`FrameLayout`] maps variable names to frame-pointer-relative offsets
//! while one function (or `main`) is compiled. It handles:
//! - Parameter offsets (`+2`, `+3`, ...) and the return slot after them
//! - `let` locals at negative offsets, released in LIFO order
//! - Shadowing with restoration on release
//!
//! Offsets `+0` and `+1` hold the saved frame pointer and the return
//! address.

use lectlang_core::{Param, Type};
use rustc_hash::FxHashMap;

/// First parameter offset; `+0`/`+1` hold the frame linkage.
pub const FIRST_PARAM_OFFSET: i32 = 2;

/// Storage for one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Offset from the frame pointer
    pub offset: i32,
    /// Type of the stored value
    pub ty: Type,
}

/// Offset table for a single frame.
#[derive(Debug, Default)]
pub struct FrameLayout {
    /// Visible slots by name
    slots: FxHashMap<String, Slot>,

    /// Locals in declaration order, with the slot each one shadowed
    locals: Vec<(String, Option<Slot>)>,

    /// Offset of the return-value slot (functions only)
    return_offset: Option<i32>,
}

impl FrameLayout {
    /// Layout for the `main` expression: no parameters, no return slot.
    pub fn for_main() -> Self {
        Self::default()
    }

    /// Layout for a lifted function with the given parameters.
    pub fn for_function(params: &[Param]) -> Self {
        let mut layout = Self::default();
        let mut offset = FIRST_PARAM_OFFSET;
        for param in params {
            layout.slots.insert(
                param.name.clone(),
                Slot {
                    offset,
                    ty: param.ty,
                },
            );
            offset += 1;
        }
        layout.return_offset = Some(offset);
        layout
    }

    /// Bind a `let` local at `offset`.
    pub fn declare_local(&mut self, name: &str, ty: Type, offset: i32) {
        let previous = self.slots.insert(name.to_string(), Slot { offset, ty });
        self.locals.push((name.to_string(), previous));
    }

    /// Release the most recently declared local.
    pub fn release_local(&mut self) {
        let Some((name, previous)) = self.locals.pop() else {
            return;
        };
        match previous {
            Some(slot) => {
                self.slots.insert(name, slot);
            }
            None => {
                self.slots.remove(&name);
            }
        }
    }

    /// Look up the slot a name refers to.
    pub fn get(&self, name: &str) -> Option<Slot> {
        self.slots.get(name).copied()
    }

    /// Offset of the return-value slot, if this is a function frame.
    pub fn return_offset(&self) -> Option<i32> {
        self.return_offset
    }

    /// Number of locals currently live.
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }
}
