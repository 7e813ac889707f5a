//! Register names and their storage descriptors.
//!
//! The machine has nine 32-bit storage slots. Every other register name is a
//! view onto one of them: a [`Register`] resolves to a `(Slot, Width)` pair,
//! and the width fixes both the mask and the bit shift of the view.

use std::fmt;
use std::str::FromStr;

use crate::error::NameError;

/// A canonical 32-bit storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Eax,
    Ebx,
    Ecx,
    Edx,
    Esi,
    Edi,
    Ebp,
    Esp,
    Eip,
}

impl Slot {
    /// Display order of the slots.
    pub const ALL: [Slot; 9] = [
        Slot::Eax,
        Slot::Ebx,
        Slot::Ecx,
        Slot::Edx,
        Slot::Esi,
        Slot::Edi,
        Slot::Ebp,
        Slot::Esp,
        Slot::Eip,
    ];

    /// Position of this slot in [`Slot::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The 32-bit register naming this slot.
    pub fn register(self) -> Register {
        match self {
            Slot::Eax => Register::Eax,
            Slot::Ebx => Register::Ebx,
            Slot::Ecx => Register::Ecx,
            Slot::Edx => Register::Edx,
            Slot::Esi => Register::Esi,
            Slot::Edi => Register::Edi,
            Slot::Ebp => Register::Ebp,
            Slot::Esp => Register::Esp,
            Slot::Eip => Register::Eip,
        }
    }

    pub fn name(self) -> &'static str {
        self.register().name()
    }
}

/// Width class of a register view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// Bits 31..0.
    Dword,
    /// Bits 15..0.
    Word,
    /// Bits 15..8.
    High,
    /// Bits 7..0.
    Low,
}

impl Width {
    pub fn bits(self) -> u32 {
        match self {
            Width::Dword => 32,
            Width::Word => 16,
            Width::High | Width::Low => 8,
        }
    }

    /// Position of the view's least significant bit inside its slot.
    pub fn shift(self) -> u32 {
        match self {
            Width::High => 8,
            Width::Dword | Width::Word | Width::Low => 0,
        }
    }

    /// Mask of the view's value, before shifting into place.
    pub fn mask(self) -> u32 {
        match self {
            Width::Dword => 0xFFFF_FFFF,
            Width::Word => 0xFFFF,
            Width::High | Width::Low => 0xFF,
        }
    }

    /// Mask of the bits the view occupies inside its slot.
    pub fn slot_mask(self) -> u32 {
        self.mask() << self.shift()
    }

    /// Bit that holds the sign when the view is read as a signed value.
    pub fn sign_bit(self) -> u32 {
        1 << (self.bits() - 1)
    }

    /// Sign-extend a value of this width to `i64`.
    pub fn signed(self, value: u32) -> i64 {
        let value = value & self.mask();
        if value & self.sign_bit() != 0 {
            value as i64 - (1i64 << self.bits())
        } else {
            value as i64
        }
    }
}

/// Every addressable register name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    // 32-bit
    Eax,
    Ebx,
    Ecx,
    Edx,
    Esi,
    Edi,
    Ebp,
    Esp,
    Eip,
    // 16-bit
    Ax,
    Bx,
    Cx,
    Dx,
    Si,
    Di,
    Bp,
    Sp,
    // 8-bit high
    Ah,
    Bh,
    Ch,
    Dh,
    // 8-bit low
    Al,
    Bl,
    Cl,
    Dl,
}

/// All register names.
pub const ALL_REGISTERS: [Register; 25] = [
    Register::Eax,
    Register::Ebx,
    Register::Ecx,
    Register::Edx,
    Register::Esi,
    Register::Edi,
    Register::Ebp,
    Register::Esp,
    Register::Eip,
    Register::Ax,
    Register::Bx,
    Register::Cx,
    Register::Dx,
    Register::Si,
    Register::Di,
    Register::Bp,
    Register::Sp,
    Register::Ah,
    Register::Bh,
    Register::Ch,
    Register::Dh,
    Register::Al,
    Register::Bl,
    Register::Cl,
    Register::Dl,
];

impl Register {
    pub fn name(self) -> &'static str {
        match self {
            Register::Eax => "eax",
            Register::Ebx => "ebx",
            Register::Ecx => "ecx",
            Register::Edx => "edx",
            Register::Esi => "esi",
            Register::Edi => "edi",
            Register::Ebp => "ebp",
            Register::Esp => "esp",
            Register::Eip => "eip",
            Register::Ax => "ax",
            Register::Bx => "bx",
            Register::Cx => "cx",
            Register::Dx => "dx",
            Register::Si => "si",
            Register::Di => "di",
            Register::Bp => "bp",
            Register::Sp => "sp",
            Register::Ah => "ah",
            Register::Bh => "bh",
            Register::Ch => "ch",
            Register::Dh => "dh",
            Register::Al => "al",
            Register::Bl => "bl",
            Register::Cl => "cl",
            Register::Dl => "dl",
        }
    }

    /// The parent slot this name reads and writes.
    pub fn slot(self) -> Slot {
        match self {
            Register::Eax | Register::Ax | Register::Ah | Register::Al => Slot::Eax,
            Register::Ebx | Register::Bx | Register::Bh | Register::Bl => Slot::Ebx,
            Register::Ecx | Register::Cx | Register::Ch | Register::Cl => Slot::Ecx,
            Register::Edx | Register::Dx | Register::Dh | Register::Dl => Slot::Edx,
            Register::Esi | Register::Si => Slot::Esi,
            Register::Edi | Register::Di => Slot::Edi,
            Register::Ebp | Register::Bp => Slot::Ebp,
            Register::Esp | Register::Sp => Slot::Esp,
            Register::Eip => Slot::Eip,
        }
    }

    pub fn width(self) -> Width {
        match self {
            Register::Eax
            | Register::Ebx
            | Register::Ecx
            | Register::Edx
            | Register::Esi
            | Register::Edi
            | Register::Ebp
            | Register::Esp
            | Register::Eip => Width::Dword,
            Register::Ax
            | Register::Bx
            | Register::Cx
            | Register::Dx
            | Register::Si
            | Register::Di
            | Register::Bp
            | Register::Sp => Width::Word,
            Register::Ah | Register::Bh | Register::Ch | Register::Dh => Width::High,
            Register::Al | Register::Bl | Register::Cl | Register::Dl => Width::Low,
        }
    }

    /// Only the execution unit moves `eip`; instructions may not name it.
    pub fn is_protected(self) -> bool {
        self == Register::Eip
    }
}

impl FromStr for Register {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        ALL_REGISTERS
            .iter()
            .find(|r| r.name() == lower)
            .copied()
            .ok_or_else(|| NameError::UnknownRegister(s.to_string()))
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
