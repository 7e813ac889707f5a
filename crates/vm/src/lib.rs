//! regsim engine: steps a validated token stream against a register file,
//! a flags word and a call/data stack.
//!
//! The machine has:
//! - Nine 32-bit registers with 16-bit and 8-bit views
//! - A flags word rebuilt by `add`, `sub` and `cmp`
//! - A stack bounded by a configured capacity in bytes
//!
//! Execution is caller-driven: [`Machine::step`] runs exactly one
//! instruction (or skips one label) and returns. There is no run loop here.
//!
//! # Usage
//!
//! ```
//! use regsim_vm::{Machine, StepOutcome};
//!
//! let mut machine = Machine::default();
//! machine.load("mov eax, 5\nmov ebx, 3\nadd eax, ebx\nhlt\n").unwrap();
//!
//! while machine.step().unwrap() != StepOutcome::Halted {}
//! assert_eq!(machine.register("eax").unwrap(), 8);
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod machine;
pub mod registers;
pub mod stack;

mod alu;

pub use config::{MachineConfig, DEFAULT_STACK_CAPACITY};
pub use error::RuntimeError;
pub use execute::StepOutcome;
pub use machine::Machine;
pub use registers::RegisterFile;
pub use stack::Stack;
