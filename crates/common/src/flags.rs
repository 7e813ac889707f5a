//! The flags word and its named bits.

use std::fmt;
use std::str::FromStr;

use crate::error::NameError;

/// A named status bit in the flags word.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Carry = 0x0001,
    Parity = 0x0004,
    AuxCarry = 0x0010,
    Zero = 0x0040,
    Sign = 0x0080,
    Overflow = 0x0800,
}

/// All flags, lowest bit first.
pub const ALL_FLAGS: [Flag; 6] = [
    Flag::Carry,
    Flag::Parity,
    Flag::AuxCarry,
    Flag::Zero,
    Flag::Sign,
    Flag::Overflow,
];

impl Flag {
    pub fn mask(self) -> u32 {
        self as u32
    }

    /// Two-letter name, e.g. `zf`.
    pub fn short_name(self) -> &'static str {
        match self {
            Flag::Carry => "cf",
            Flag::Parity => "pf",
            Flag::AuxCarry => "af",
            Flag::Zero => "zf",
            Flag::Sign => "sf",
            Flag::Overflow => "of",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Flag::Carry => "carry",
            Flag::Parity => "parity",
            Flag::AuxCarry => "auxiliary-carry",
            Flag::Zero => "zero",
            Flag::Sign => "sign",
            Flag::Overflow => "overflow",
        }
    }
}

impl FromStr for Flag {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        ALL_FLAGS
            .iter()
            .find(|f| f.short_name() == lower || f.long_name() == lower)
            .copied()
            .ok_or_else(|| NameError::UnknownFlag(s.to_string()))
    }
}

/// The flags word.
///
/// Arithmetic and compare instructions replace it wholesale; nothing merges
/// into a previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u32);

impl Flags {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, flag: Flag) -> bool {
        self.0 & flag.mask() != 0
    }

    pub fn set(&mut self, flag: Flag, on: bool) {
        if on {
            self.0 |= flag.mask();
        } else {
            self.0 &= !flag.mask();
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Flag> {
        ALL_FLAGS.into_iter().filter(move |f| self.contains(*f))
    }
}

impl fmt::Display for Flags {
    /// `0x0044 [pf zf]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x} [", self.0)?;
        for (i, flag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(flag.short_name())?;
        }
        f.write_str("]")
    }
}
