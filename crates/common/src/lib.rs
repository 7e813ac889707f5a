//! regsim common types.
//!
//! This crate provides the vocabulary shared by the assembler and the
//! execution engine:
//!
//! - [`Opcode`] and its operand [`Shape`]
//! - [`Register`], its parent [`Slot`] and view [`Width`]
//! - [`Flag`] and the [`Flags`] word
//! - [`Token`] and [`Program`], the validated token stream
//! - [`NameError`] for names that resolve to nothing

pub mod error;
pub mod flags;
pub mod opcode;
pub mod program;
pub mod register;
pub mod token;

// Re-export commonly used types at the crate root.
pub use error::NameError;
pub use flags::{Flag, Flags, ALL_FLAGS};
pub use opcode::{Opcode, Shape, ALL_OPCODES};
pub use program::Program;
pub use register::{Register, Slot, Width, ALL_REGISTERS};
pub use token::Token;
