//! Tokens of a validated program.

use std::fmt;

use crate::opcode::Opcode;
use crate::register::Register;

/// One element of the token stream.
///
/// The lexer resolves every word once; the execution unit never re-parses
/// text. An instruction occupies `opcode.width()` consecutive tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A label declaration (`name:`). Executes as a zero-cost skip.
    Label(String),
    /// An instruction mnemonic.
    Op(Opcode),
    /// A register operand.
    Reg(Register),
    /// An immediate operand, as its 32-bit pattern.
    Imm(u32),
    /// A label reference operand of a control-flow instruction.
    Target(String),
}

impl Token {
    /// The mnemonic, if this token starts an instruction.
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Token::Op(op) => Some(*op),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Label(name) => write!(f, "{name}:"),
            Token::Op(op) => write!(f, "{op}"),
            Token::Reg(reg) => write!(f, "{reg}"),
            Token::Imm(value) => write!(f, "{value}"),
            Token::Target(name) => f.write_str(name),
        }
    }
}
