//! Single-step execution and opcode dispatch for the regsim engine.
//!
//! Each handler is a free function over a [`Context`]: it validates and
//! reads every operand first, then writes, so a failing instruction leaves
//! the machine untouched. Handlers report how `eip` moves as a [`Flow`].

use regsim_common::{Flag, Opcode, Program, Register, Slot, Token};
use tracing::{trace, warn};

use crate::alu::{arith, ArithOp};
use crate::error::RuntimeError;
use crate::machine::{Machine, State};

/// What a call to [`Machine::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction ran and moved `eip`.
    Executed(Opcode),
    /// A label token was passed over.
    Skipped,
    /// `hlt` ran; `eip` did not move.
    Halted,
    /// Nothing is loaded or `eip` is outside the token stream; nothing changed.
    Finished,
}

/// How an instruction moves `eip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Forward by this many tokens.
    Advance(usize),
    /// To this token index.
    Jump(usize),
    /// Nowhere.
    Stay,
}

impl Machine {
    /// Execute exactly one instruction, or skip one label.
    pub fn step(&mut self) -> Result<StepOutcome, RuntimeError> {
        let Machine { program, state, .. } = self;
        let Some(program) = program.as_ref() else {
            return Ok(StepOutcome::Finished);
        };
        let eip = state.eip();
        let Some(token) = program.get(eip) else {
            return Ok(StepOutcome::Finished);
        };
        let line = program.line_of(eip).unwrap_or(0);

        let opcode = match token {
            Token::Op(op) => *op,
            Token::Label(name) => {
                trace!(eip, line, label = %name, "skip label");
                state.set_eip(eip + 1);
                return Ok(StepOutcome::Skipped);
            }
            other => {
                let err = RuntimeError::UnknownInstruction {
                    line,
                    token: other.to_string(),
                };
                warn!(eip, %err, "step failed");
                return Err(err);
            }
        };

        trace!(eip, line, %opcode, "step");
        let mut cx = Context {
            state: &mut *state,
            program,
            opcode,
            eip,
            line,
        };
        let flow = match dispatch(&mut cx) {
            Ok(flow) => flow,
            Err(err) => {
                warn!(eip, %err, "step failed");
                return Err(err);
            }
        };

        match flow {
            Flow::Advance(n) => state.set_eip(eip + n),
            Flow::Jump(target) => state.set_eip(target),
            Flow::Stay => return Ok(StepOutcome::Halted),
        }
        Ok(StepOutcome::Executed(opcode))
    }
}

/// Mutable machine state plus the instruction being executed.
struct Context<'a> {
    state: &'a mut State,
    program: &'a Program,
    opcode: Opcode,
    eip: usize,
    line: usize,
}

impl Context<'_> {
    fn operand(&self, n: usize) -> Result<&Token, RuntimeError> {
        self.program
            .get(self.eip + n)
            .ok_or_else(|| self.mismatch())
    }

    fn register(&self, n: usize) -> Result<Register, RuntimeError> {
        match self.operand(n)? {
            Token::Reg(reg) => Ok(*reg),
            _ => Err(self.mismatch()),
        }
    }

    /// A register or immediate operand, zero-extended.
    fn value(&self, n: usize) -> Result<u32, RuntimeError> {
        match self.operand(n)? {
            Token::Reg(reg) => Ok(self.state.regs.get(*reg)),
            Token::Imm(value) => Ok(*value),
            _ => Err(self.mismatch()),
        }
    }

    /// Token index of the label named by a target operand.
    fn target(&self, n: usize) -> Result<usize, RuntimeError> {
        match self.operand(n)? {
            Token::Target(name) => {
                self.program
                    .label(name)
                    .ok_or_else(|| RuntimeError::LabelNotFound {
                        line: self.line,
                        label: name.clone(),
                    })
            }
            _ => Err(self.mismatch()),
        }
    }

    fn mismatch(&self) -> RuntimeError {
        RuntimeError::OperandMismatch {
            line: self.line,
            mnemonic: self.opcode.mnemonic(),
        }
    }

    /// `esp` after one more push, or overflow if that leaves the capacity.
    fn esp_after_push(&self) -> Result<u32, RuntimeError> {
        let esp = self.state.regs.slot(Slot::Esp).wrapping_sub(4);
        if esp > self.state.capacity {
            return Err(RuntimeError::StackOverflow {
                line: self.line,
                capacity: self.state.capacity,
            });
        }
        Ok(esp)
    }
}

fn dispatch(cx: &mut Context<'_>) -> Result<Flow, RuntimeError> {
    match cx.opcode {
        Opcode::Mov => exec_mov(cx),
        Opcode::Add => exec_arith(cx, ArithOp::Add, true),
        Opcode::Sub => exec_arith(cx, ArithOp::Sub, true),
        Opcode::Cmp => exec_arith(cx, ArithOp::Sub, false),
        Opcode::Mul => exec_mul(cx),
        Opcode::Div => exec_div(cx),
        Opcode::Inc => exec_unary(cx, |v| v.wrapping_add(1)),
        Opcode::Dec => exec_unary(cx, |v| v.wrapping_sub(1)),
        Opcode::Not => exec_unary(cx, |v| !v),

        Opcode::And => exec_bitwise(cx, |a, b| a & b),
        Opcode::Or => exec_bitwise(cx, |a, b| a | b),
        Opcode::Xor => exec_bitwise(cx, |a, b| a ^ b),
        Opcode::Shl => exec_bitwise(cx, |a, n| a.checked_shl(n).unwrap_or(0)),
        Opcode::Shr => exec_bitwise(cx, |a, n| a.checked_shr(n).unwrap_or(0)),

        Opcode::Push => exec_push(cx),
        Opcode::Pop => exec_pop(cx),
        Opcode::Call => exec_call(cx),
        Opcode::Ret => exec_ret(cx),

        Opcode::Jmp => exec_jump_if(cx, true),
        Opcode::Je | Opcode::Jz => {
            let taken = cx.state.flags.contains(Flag::Zero);
            exec_jump_if(cx, taken)
        }
        Opcode::Jne | Opcode::Jnz => {
            let taken = !cx.state.flags.contains(Flag::Zero);
            exec_jump_if(cx, taken)
        }
        Opcode::Jg | Opcode::Jns => {
            let taken = cx.state.flags.contains(Flag::Overflow);
            exec_jump_if(cx, taken)
        }
        Opcode::Jl | Opcode::Js => {
            let taken = cx.state.flags.contains(Flag::Sign);
            exec_jump_if(cx, taken)
        }

        Opcode::Hlt => Ok(Flow::Stay),
    }
}

fn exec_mov(cx: &mut Context<'_>) -> Result<Flow, RuntimeError> {
    let dst = cx.register(1)?;
    let value = cx.value(2)?;
    cx.state.regs.set(dst, value);
    Ok(Flow::Advance(3))
}

/// `add`/`sub`, or `cmp` when `store` is false. Replaces the flags word.
fn exec_arith(cx: &mut Context<'_>, op: ArithOp, store: bool) -> Result<Flow, RuntimeError> {
    let dst = cx.register(1)?;
    let rhs = cx.value(2)?;
    let lhs = cx.state.regs.get(dst);
    let (result, flags) = arith(op, lhs, rhs, dst.width());
    if store {
        cx.state.regs.set(dst, result);
    }
    cx.state.flags = flags;
    Ok(Flow::Advance(3))
}

/// `dst := f(dst, src)` masked to the destination width. Flags untouched.
fn exec_bitwise(cx: &mut Context<'_>, f: impl Fn(u32, u32) -> u32) -> Result<Flow, RuntimeError> {
    let dst = cx.register(1)?;
    let rhs = cx.value(2)?;
    let lhs = cx.state.regs.get(dst);
    cx.state.regs.set(dst, f(lhs, rhs));
    Ok(Flow::Advance(3))
}

/// `dst := f(dst)` masked to the destination width. Flags untouched.
fn exec_unary(cx: &mut Context<'_>, f: impl Fn(u32) -> u32) -> Result<Flow, RuntimeError> {
    let dst = cx.register(1)?;
    let value = cx.state.regs.get(dst);
    cx.state.regs.set(dst, f(value));
    Ok(Flow::Advance(2))
}

fn exec_mul(cx: &mut Context<'_>) -> Result<Flow, RuntimeError> {
    let factor = cx.value(1)?;
    let eax = cx.state.regs.get(Register::Eax);
    cx.state.regs.set(Register::Eax, eax.wrapping_mul(factor));
    Ok(Flow::Advance(2))
}

fn exec_div(cx: &mut Context<'_>) -> Result<Flow, RuntimeError> {
    let divisor = cx.value(1)?;
    if divisor == 0 {
        return Err(RuntimeError::DivisionByZero { line: cx.line });
    }
    let eax = cx.state.regs.get(Register::Eax);
    cx.state.regs.set(Register::Edx, eax % divisor);
    cx.state.regs.set(Register::Eax, eax / divisor);
    Ok(Flow::Advance(2))
}

fn exec_push(cx: &mut Context<'_>) -> Result<Flow, RuntimeError> {
    let value = cx.value(1)?;
    let esp = cx.esp_after_push()?;
    cx.state.stack.push(value);
    cx.state.regs.set_slot(Slot::Esp, esp);
    Ok(Flow::Advance(2))
}

fn exec_pop(cx: &mut Context<'_>) -> Result<Flow, RuntimeError> {
    let dst = cx.register(1)?;
    let value = cx
        .state
        .stack
        .pop()
        .ok_or(RuntimeError::StackUnderflow { line: cx.line })?;
    cx.state.regs.set(dst, value);
    // Read after the write: `pop esp` leaves the popped value plus 4.
    let esp = cx.state.regs.slot(Slot::Esp).wrapping_add(4);
    cx.state.regs.set_slot(Slot::Esp, esp);
    Ok(Flow::Advance(2))
}

fn exec_call(cx: &mut Context<'_>) -> Result<Flow, RuntimeError> {
    let target = cx.target(1)?;
    let esp = cx.esp_after_push()?;
    cx.state.stack.push((cx.eip + 2) as u32);
    cx.state.regs.set_slot(Slot::Esp, esp);
    Ok(Flow::Jump(target))
}

fn exec_ret(cx: &mut Context<'_>) -> Result<Flow, RuntimeError> {
    let target = cx
        .state
        .stack
        .pop()
        .ok_or(RuntimeError::StackUnderflow { line: cx.line })?;
    let esp = cx.state.regs.slot(Slot::Esp).wrapping_add(4);
    cx.state.regs.set_slot(Slot::Esp, esp);
    Ok(Flow::Jump(target as usize))
}

/// Jump to the operand's label when `taken`, otherwise skip mnemonic and operand.
///
/// A missing label is only an error when the jump is taken.
fn exec_jump_if(cx: &mut Context<'_>, taken: bool) -> Result<Flow, RuntimeError> {
    if taken {
        Ok(Flow::Jump(cx.target(1)?))
    } else {
        Ok(Flow::Advance(2))
    }
}
