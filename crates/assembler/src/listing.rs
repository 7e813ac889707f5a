//! Listing: token stream → canonical assembly text.
//!
//! Output format is one label or instruction per line. Labels are flush
//! left, instructions are indented four spaces, pair operands are separated
//! by `", "`. No comments, no blank lines.

use regsim_common::{Program, Token};

/// Render a program as canonical assembly text.
///
/// The output reassembles to the same token stream
/// (`assemble(&listing(p))?.tokens() == p.tokens()`).
pub fn listing(program: &Program) -> String {
    let mut out = String::new();
    let tokens = program.tokens();
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Op(op) => {
                let width = op.width().min(tokens.len() - i);
                out.push_str("    ");
                out.push_str(&instruction_text(&tokens[i..i + width]));
                i += width;
            }
            other => {
                out.push_str(&other.to_string());
                i += 1;
            }
        }
        out.push('\n');
    }

    out
}

/// `mnemonic op1, op2` for a slice holding one complete instruction.
pub fn instruction_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate() {
        match i {
            0 => {}
            1 => text.push(' '),
            _ => text.push_str(", "),
        }
        text.push_str(&token.to_string());
    }
    text
}
