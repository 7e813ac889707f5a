//! Name resolution errors for mnemonics, registers and flags.

use thiserror::Error;

/// A textual name that does not denote any known mnemonic, register or flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Not one of the supported instruction mnemonics.
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),

    /// Not a 32-bit, 16-bit or 8-bit register name.
    #[error("unknown register '{0}'")]
    UnknownRegister(String),

    /// Not a flag short name (`zf`) or long name (`zero`).
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),
}
