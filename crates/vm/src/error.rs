//! Runtime errors for the regsim engine.
//!
//! These are errors that can only happen while stepping, not while loading.
//! Every step error includes the 1-based source line of the instruction
//! that raised it. A failing instruction leaves all machine state as it was.

use thiserror::Error;

/// Errors that occur during execution or state queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `eip` points at a token that is not an instruction or label.
    #[error("line {line}: unknown instruction '{token}'")]
    UnknownInstruction { line: usize, token: String },

    /// `div` by a register holding zero.
    #[error("line {line}: division by zero")]
    DivisionByZero { line: usize },

    /// `push` or `call` would move `esp` past the configured capacity.
    #[error("line {line}: stack overflow (capacity {capacity} bytes)")]
    StackOverflow { line: usize, capacity: u32 },

    /// `pop` or `ret` with an empty stack.
    #[error("line {line}: stack underflow")]
    StackUnderflow { line: usize },

    /// A jump or call target with no matching `label:` declaration.
    #[error("line {line}: label '{label}' not found")]
    LabelNotFound { line: usize, label: String },

    /// An instruction's operand tokens do not match its shape.
    #[error("line {line}: malformed operands for '{mnemonic}'")]
    OperandMismatch { line: usize, mnemonic: &'static str },

    /// A register query with a name that is not a register.
    #[error("line {line}: invalid register '{name}'")]
    InvalidRegister { line: usize, name: String },

    /// A flag query with a name that is not a flag.
    #[error("unknown flag '{name}'")]
    UnknownFlag { name: String },
}

impl RuntimeError {
    /// Source line the error is tagged with, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::UnknownInstruction { line, .. }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::StackOverflow { line, .. }
            | RuntimeError::StackUnderflow { line }
            | RuntimeError::LabelNotFound { line, .. }
            | RuntimeError::OperandMismatch { line, .. }
            | RuntimeError::InvalidRegister { line, .. } => Some(*line),
            RuntimeError::UnknownFlag { .. } => None,
        }
    }
}
