//! Machine state: registers, flags, stack and the loaded program.

use regsim_assembler::{assemble, AsmError};
use regsim_common::{Flag, Flags, Program, Register, Slot};
use tracing::debug;

use crate::config::MachineConfig;
use crate::error::RuntimeError;
use crate::registers::RegisterFile;
use crate::stack::Stack;

/// Everything an instruction may mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct State {
    pub(crate) regs: RegisterFile,
    pub(crate) flags: Flags,
    pub(crate) stack: Stack,
    /// Stack capacity in bytes; the initial `esp`.
    pub(crate) capacity: u32,
}

impl State {
    pub(crate) fn new(capacity: u32) -> Self {
        let mut regs = RegisterFile::new();
        regs.set_slot(Slot::Ebp, capacity);
        regs.set_slot(Slot::Esp, capacity);
        Self {
            regs,
            flags: Flags::empty(),
            stack: Stack::new(),
            capacity,
        }
    }

    pub(crate) fn eip(&self) -> usize {
        self.regs.slot(Slot::Eip) as usize
    }

    pub(crate) fn set_eip(&mut self, eip: usize) {
        self.regs.set_slot(Slot::Eip, eip as u32);
    }
}

/// The regsim engine.
///
/// Long-lived and reusable: load a program, step it, query it, reset it,
/// load another. All mutation goes through [`Machine::load`],
/// [`Machine::reset`] and [`Machine::step`].
#[derive(Debug, Clone)]
pub struct Machine {
    pub(crate) config: MachineConfig,
    pub(crate) program: Option<Program>,
    pub(crate) state: State,
}

impl Machine {
    /// Create a machine with no program loaded and all state reset.
    pub fn new(config: MachineConfig) -> Self {
        Self {
            config,
            program: None,
            state: State::new(config.stack_capacity),
        }
    }

    /// Create a machine with the given stack capacity in bytes.
    pub fn with_stack_capacity(bytes: u32) -> Self {
        Self::new(MachineConfig::with_stack_capacity(bytes))
    }

    /// Validate `source` and make it the current program.
    ///
    /// All-or-nothing: on error the previous program, if any, stays loaded.
    /// Registers, flags and the stack are not touched; call
    /// [`Machine::reset`] to start the new program from the top.
    pub fn load(&mut self, source: &str) -> Result<(), AsmError> {
        let program = assemble(source)?;
        self.load_program(program);
        Ok(())
    }

    /// Make an already validated program current.
    pub fn load_program(&mut self, program: Program) {
        debug!(
            tokens = program.len(),
            labels = program.labels().count(),
            "program loaded"
        );
        self.program = Some(program);
    }

    /// Restore registers, flags, stack and `eip` to their initial values.
    ///
    /// General registers and `eflags` become 0, `esp` and `ebp` become the
    /// stack capacity, the stack is emptied. The loaded program is kept.
    pub fn reset(&mut self) {
        debug!(stack_capacity = self.config.stack_capacity, "machine reset");
        self.state = State::new(self.config.stack_capacity);
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    /// Value of a register by name, any width alias, including `eip`.
    pub fn register(&self, name: &str) -> Result<u32, RuntimeError> {
        let reg: Register = name.parse().map_err(|_| RuntimeError::InvalidRegister {
            line: self.current_line().unwrap_or(0),
            name: name.to_string(),
        })?;
        Ok(self.get(reg))
    }

    /// Value of a register, zero-extended.
    pub fn get(&self, reg: Register) -> u32 {
        self.state.regs.get(reg)
    }

    /// The 32-bit register names in display order.
    pub fn register_names(&self) -> [&'static str; 9] {
        Slot::ALL.map(Slot::name)
    }

    /// Whether the named flag (`zf`, `zero`, ...) is set.
    pub fn flag(&self, name: &str) -> Result<bool, RuntimeError> {
        let flag: Flag = name.parse().map_err(|_| RuntimeError::UnknownFlag {
            name: name.to_string(),
        })?;
        Ok(self.has_flag(flag))
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.state.flags.contains(flag)
    }

    /// The raw flags word.
    pub fn eflags(&self) -> u32 {
        self.state.flags.bits()
    }

    pub fn flags(&self) -> Flags {
        self.state.flags
    }

    /// Index of the next token to execute.
    pub fn eip(&self) -> usize {
        self.state.eip()
    }

    /// Values on the stack, bottom first.
    pub fn stack(&self) -> &[u32] {
        self.state.stack.as_slice()
    }

    /// True when no program is loaded or `eip` is outside the token stream.
    pub fn is_finished(&self) -> bool {
        self.program
            .as_ref()
            .map_or(true, |program| self.eip() >= program.len())
    }

    /// 1-based source line of the token about to execute.
    pub fn current_line(&self) -> Option<usize> {
        self.program.as_ref()?.line_of(self.eip())
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}
