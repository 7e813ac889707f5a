//! Error types for the regsim assembler.

use thiserror::Error;

/// Errors produced while validating source text.
///
/// Every variant carries the 1-based source line. Loading stops at the
/// first error and publishes nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// The first word of an instruction line is not a known mnemonic.
    #[error("line {line}: unknown mnemonic '{token}'")]
    UnknownMnemonic { line: usize, token: String },

    /// Two operands separated by whitespace instead of a comma.
    #[error("line {line}: missing comma, expected `{form}`")]
    MissingComma { line: usize, form: &'static str },

    /// Too many or too few operands for the mnemonic.
    #[error("line {line}: expected `{form}`, found {found} operand(s)")]
    OperandCount {
        line: usize,
        form: &'static str,
        found: usize,
    },

    /// A word in register position that names no register.
    #[error("line {line}: invalid register '{token}'")]
    InvalidRegister { line: usize, token: String },

    /// `eip` used as an instruction operand.
    #[error("line {line}: register '{token}' cannot be used as an operand")]
    ProtectedRegister { line: usize, token: String },

    /// A numeric literal that is malformed or does not fit in 32 bits.
    #[error("line {line}: invalid immediate '{token}'")]
    InvalidImmediate { line: usize, token: String },

    /// A well-formed operand in a position that does not accept it.
    #[error("line {line}: unexpected operand '{token}', expected `{form}`")]
    InvalidOperand {
        line: usize,
        token: String,
        form: &'static str,
    },

    /// A label declaration or reference that is not an identifier.
    #[error("line {line}: invalid label '{token}'")]
    InvalidLabel { line: usize, token: String },
}

impl AsmError {
    /// The 1-based source line the error points at.
    pub fn line(&self) -> usize {
        match self {
            AsmError::UnknownMnemonic { line, .. }
            | AsmError::MissingComma { line, .. }
            | AsmError::OperandCount { line, .. }
            | AsmError::InvalidRegister { line, .. }
            | AsmError::ProtectedRegister { line, .. }
            | AsmError::InvalidImmediate { line, .. }
            | AsmError::InvalidOperand { line, .. }
            | AsmError::InvalidLabel { line, .. } => *line,
        }
    }
}
