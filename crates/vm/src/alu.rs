//! Add/subtract with the machine's simplified flag formulas.
//!
//! The flags are an approximation, not hardware ALU output. After every
//! add/sub/cmp exactly one of zero, sign and overflow is set, and the
//! conditional jumps read those three bits directly:
//!
//! | flag     | set when                                            |
//! |----------|-----------------------------------------------------|
//! | zero     | result is 0                                         |
//! | sign     | result is negative as a signed value of its width   |
//! | overflow | result is positive as a signed value of its width   |
//! | parity   | result is even                                      |
//! | carry    | exact result falls outside `0..=mask`               |
//! | aux      | bit 4 of `a ^ b ^ result` (carry out of bit 3)      |

use regsim_common::{Flag, Flags, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithOp {
    Add,
    Sub,
}

/// Compute `a op b` within `width` and the flags word it produces.
pub(crate) fn arith(op: ArithOp, a: u32, b: u32, width: Width) -> (u32, Flags) {
    let mask = width.mask();
    let (a, b) = (a & mask, b & mask);
    let wide = match op {
        ArithOp::Add => a as i64 + b as i64,
        ArithOp::Sub => a as i64 - b as i64,
    };
    let result = (wide as u64 & mask as u64) as u32;

    let mut flags = Flags::empty();
    flags.set(Flag::Zero, result == 0);
    flags.set(Flag::Sign, result & width.sign_bit() != 0);
    flags.set(Flag::Parity, result & 1 == 0);
    flags.set(Flag::Carry, wide < 0 || wide > mask as i64);
    flags.set(Flag::AuxCarry, (a ^ b ^ result) & 0x10 != 0);
    flags.set(Flag::Overflow, width.signed(result) > 0);
    (result, flags)
}
