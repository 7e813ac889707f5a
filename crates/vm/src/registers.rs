//! Register file: nine 32-bit slots with width-aliased views.

use regsim_common::{Register, Slot};

/// Canonical register storage.
///
/// Narrow registers have no storage of their own. Reads mask and shift the
/// parent slot; writes merge into it and leave every other bit alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterFile {
    slots: [u32; 9],
}

impl RegisterFile {
    /// All slots zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a register view, zero-extended.
    pub fn get(&self, reg: Register) -> u32 {
        let width = reg.width();
        (self.slots[reg.slot().index()] >> width.shift()) & width.mask()
    }

    /// Write a register view. Bits of `value` above the view's width are dropped.
    pub fn set(&mut self, reg: Register, value: u32) {
        let width = reg.width();
        let slot = &mut self.slots[reg.slot().index()];
        *slot = (*slot & !width.slot_mask()) | ((value & width.mask()) << width.shift());
    }

    pub fn slot(&self, slot: Slot) -> u32 {
        self.slots[slot.index()]
    }

    pub fn set_slot(&mut self, slot: Slot, value: u32) {
        self.slots[slot.index()] = value;
    }
}
