//! Opcode definitions for the regsim instruction set.
//!
//! Every mnemonic the lexer accepts has exactly one variant here. The
//! execution unit dispatches with an exhaustive `match` over [`Opcode`], so
//! adding a variant is a compile error until it has a handler.

use std::fmt;
use std::str::FromStr;

use crate::error::NameError;

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Data movement and arithmetic
    /// `dst := src`.
    Mov,
    /// `dst := dst + src`, flags recomputed.
    Add,
    /// `dst := dst - src`, flags recomputed.
    Sub,
    /// Computes `left - right` for the flags only.
    Cmp,
    /// `eax := eax * value`.
    Mul,
    /// `edx := eax mod value`, `eax := eax / value`.
    Div,
    /// `dst := dst + 1`.
    Inc,
    /// `dst := dst - 1`.
    Dec,

    // Bitwise
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise complement.
    Not,
    /// Logical shift left.
    Shl,
    /// Logical shift right.
    Shr,

    // Stack
    /// Push a register or immediate onto the stack.
    Push,
    /// Pop the top of the stack into a register.
    Pop,
    /// Push the return index and jump to a label.
    Call,
    /// Pop a token index into `eip`.
    Ret,

    // Control flow
    /// Unconditional jump.
    Jmp,
    /// Jump if the zero flag is set.
    Je,
    /// Alias of `je`.
    Jz,
    /// Jump if the zero flag is clear.
    Jne,
    /// Alias of `jne`.
    Jnz,
    /// Jump if the overflow flag is set.
    Jg,
    /// Alias of `jg`.
    Jns,
    /// Jump if the sign flag is set.
    Jl,
    /// Alias of `jl`.
    Js,
    /// Stop; `eip` stays put.
    Hlt,
}

/// Operand layout an opcode expects on its source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `op <register>, <register|immediate>`
    Pair,
    /// `op <register>`
    Register,
    /// `op <register|immediate>`
    Value,
    /// `op <label>`
    Label,
    /// `op`
    Bare,
}

impl Shape {
    /// Number of operand tokens that follow the mnemonic.
    pub fn operand_count(self) -> usize {
        match self {
            Shape::Pair => 2,
            Shape::Register | Shape::Value | Shape::Label => 1,
            Shape::Bare => 0,
        }
    }
}

/// All opcodes, in listing order.
pub const ALL_OPCODES: [Opcode; 28] = [
    Opcode::Mov,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Cmp,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Inc,
    Opcode::Dec,
    Opcode::And,
    Opcode::Or,
    Opcode::Xor,
    Opcode::Not,
    Opcode::Shl,
    Opcode::Shr,
    Opcode::Push,
    Opcode::Pop,
    Opcode::Call,
    Opcode::Ret,
    Opcode::Jmp,
    Opcode::Je,
    Opcode::Jz,
    Opcode::Jne,
    Opcode::Jnz,
    Opcode::Jg,
    Opcode::Jns,
    Opcode::Jl,
    Opcode::Js,
    Opcode::Hlt,
];

impl Opcode {
    /// Lowercase source spelling.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Mov => "mov",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Cmp => "cmp",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Inc => "inc",
            Opcode::Dec => "dec",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Not => "not",
            Opcode::Shl => "shl",
            Opcode::Shr => "shr",
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
            Opcode::Jmp => "jmp",
            Opcode::Je => "je",
            Opcode::Jz => "jz",
            Opcode::Jne => "jne",
            Opcode::Jnz => "jnz",
            Opcode::Jg => "jg",
            Opcode::Jns => "jns",
            Opcode::Jl => "jl",
            Opcode::Js => "js",
            Opcode::Hlt => "hlt",
        }
    }

    /// Operand layout for this opcode.
    pub fn shape(&self) -> Shape {
        match self {
            Opcode::Mov
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Cmp
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Shl
            | Opcode::Shr => Shape::Pair,

            Opcode::Mul
            | Opcode::Div
            | Opcode::Inc
            | Opcode::Dec
            | Opcode::Not
            | Opcode::Pop => Shape::Register,

            Opcode::Push => Shape::Value,

            Opcode::Call
            | Opcode::Jmp
            | Opcode::Je
            | Opcode::Jz
            | Opcode::Jne
            | Opcode::Jnz
            | Opcode::Jg
            | Opcode::Jns
            | Opcode::Jl
            | Opcode::Js => Shape::Label,

            Opcode::Ret | Opcode::Hlt => Shape::Bare,
        }
    }

    /// Expected source form, quoted in syntax errors.
    pub fn syntax(&self) -> &'static str {
        match self {
            Opcode::Mov => "mov <register>, <register|immediate>",
            Opcode::Add => "add <register>, <register|immediate>",
            Opcode::Sub => "sub <register>, <register|immediate>",
            Opcode::Cmp => "cmp <register>, <register|immediate>",
            Opcode::And => "and <register>, <register|immediate>",
            Opcode::Or => "or <register>, <register|immediate>",
            Opcode::Xor => "xor <register>, <register|immediate>",
            Opcode::Shl => "shl <register>, <register|immediate>",
            Opcode::Shr => "shr <register>, <register|immediate>",
            Opcode::Mul => "mul <register>",
            Opcode::Div => "div <register>",
            Opcode::Inc => "inc <register>",
            Opcode::Dec => "dec <register>",
            Opcode::Not => "not <register>",
            Opcode::Pop => "pop <register>",
            Opcode::Push => "push <register|immediate>",
            Opcode::Call => "call <label>",
            Opcode::Jmp => "jmp <label>",
            Opcode::Je => "je <label>",
            Opcode::Jz => "jz <label>",
            Opcode::Jne => "jne <label>",
            Opcode::Jnz => "jnz <label>",
            Opcode::Jg => "jg <label>",
            Opcode::Jns => "jns <label>",
            Opcode::Jl => "jl <label>",
            Opcode::Js => "js <label>",
            Opcode::Ret => "ret",
            Opcode::Hlt => "hlt",
        }
    }

    /// Token count of a complete instruction: the mnemonic plus its operands.
    pub fn width(&self) -> usize {
        1 + self.shape().operand_count()
    }
}

impl FromStr for Opcode {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == lower)
            .copied()
            .ok_or_else(|| NameError::UnknownMnemonic(s.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
