//! regsim assembler: source text → validated token stream.
//!
//! Validation is wholesale. A program either loads completely or the first
//! offending line is reported and nothing is produced.
//!
//! # Usage
//!
//! ```
//! use regsim_assembler::{assemble, listing};
//!
//! let program = assemble("mov eax, 5\nMOV ebx,3\nadd eax, ebx\n").unwrap();
//! assert_eq!(program.len(), 9);
//! assert_eq!(listing(&program), "    mov eax, 5\n    mov ebx, 3\n    add eax, ebx\n");
//! ```
//!
//! # Syntax
//!
//! - Blank lines and everything after `;` are ignored.
//! - `name:` alone on a line declares a label.
//! - `mov add sub cmp and or xor shl shr` take `register, register|immediate`.
//! - `mul div inc dec not pop` take one register; `push` takes a register or
//!   immediate; `call jmp je jz jne jnz jg jns jl js` take a label.
//! - `ret` and `hlt` take nothing.
//!
//! Jump targets are not checked here; a missing label is a run-time error.

pub mod error;

mod lexer;
mod listing;
mod parser;

pub use error::AsmError;
pub use listing::{instruction_text, listing};

use lexer::{scan_line, Line};
use parser::parse_instruction;
use regsim_common::{Program, Token};

/// Assemble text into a program.
///
/// Returns the first error encountered. Fix one error at a time.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut tokens = Vec::new();
    let mut lines = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        match scan_line(line, line_num)? {
            None => {}
            Some(Line::Label(name)) => {
                tokens.push(Token::Label(name.to_string()));
                lines.push(line_num);
            }
            Some(Line::Instruction { mnemonic, operands }) => {
                let parsed = parse_instruction(mnemonic, operands, line_num)?;
                lines.extend(std::iter::repeat(line_num).take(parsed.len()));
                tokens.extend(parsed);
            }
        }
    }

    Ok(Program::new(tokens, lines))
}
