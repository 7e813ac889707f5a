//! Parser for instruction lines → tokens.
//!
//! Dispatches on the opcode's [`Shape`] to the operand rules for that layout.

use regsim_common::{Opcode, Register, Shape, Token};

use crate::error::AsmError;
use crate::lexer::{is_identifier, looks_numeric, parse_immediate, words};

/// Parse one instruction line into its mnemonic token followed by its operands.
pub(crate) fn parse_instruction(
    mnemonic: &str,
    operands: &str,
    line: usize,
) -> Result<Vec<Token>, AsmError> {
    let opcode: Opcode = mnemonic.parse().map_err(|_| AsmError::UnknownMnemonic {
        line,
        token: mnemonic.to_string(),
    })?;
    let form = opcode.syntax();

    let mut tokens = Vec::with_capacity(opcode.width());
    tokens.push(Token::Op(opcode));

    match opcode.shape() {
        Shape::Pair => {
            let (dst, src) = split_pair(operands, line, form)?;
            tokens.push(Token::Reg(expect_register(dst, line, form)?));
            tokens.push(expect_value(src, line, form)?);
        }
        Shape::Register => {
            let word = expect_single(operands, line, form)?;
            tokens.push(Token::Reg(expect_register(word, line, form)?));
        }
        Shape::Value => {
            let word = expect_single(operands, line, form)?;
            tokens.push(expect_value(word, line, form)?);
        }
        Shape::Label => {
            let word = expect_single(operands, line, form)?;
            if !is_identifier(word) {
                return Err(AsmError::InvalidLabel {
                    line,
                    token: word.to_string(),
                });
            }
            tokens.push(Token::Target(word.to_string()));
        }
        Shape::Bare => {
            let found = words(operands).count();
            if found > 0 || !operands.is_empty() {
                return Err(AsmError::OperandCount { line, form, found });
            }
        }
    }

    Ok(tokens)
}

/// Split `dst, src`: exactly two single-word operands around one comma.
fn split_pair<'a>(
    operands: &'a str,
    line: usize,
    form: &'static str,
) -> Result<(&'a str, &'a str), AsmError> {
    let found = words(operands).count();
    let parts: Vec<&str> = operands.split(',').map(str::trim).collect();

    match parts.as_slice() {
        [dst, src] if is_single_word(dst) && is_single_word(src) => Ok((*dst, *src)),
        [_] if found == 2 => Err(AsmError::MissingComma { line, form }),
        _ => Err(AsmError::OperandCount { line, form, found }),
    }
}

fn is_single_word(part: &str) -> bool {
    !part.is_empty() && !part.contains(char::is_whitespace)
}

/// Exactly one operand word and no stray commas.
fn expect_single<'a>(
    operands: &'a str,
    line: usize,
    form: &'static str,
) -> Result<&'a str, AsmError> {
    let mut iter = words(operands);
    match (iter.next(), iter.next()) {
        (Some(word), None) if !operands.contains(',') => Ok(word),
        _ => Err(AsmError::OperandCount {
            line,
            form,
            found: words(operands).count(),
        }),
    }
}

/// A register operand other than `eip`.
fn expect_register(word: &str, line: usize, form: &'static str) -> Result<Register, AsmError> {
    if looks_numeric(word) {
        return Err(AsmError::InvalidOperand {
            line,
            token: word.to_string(),
            form,
        });
    }
    let reg: Register = word.parse().map_err(|_| AsmError::InvalidRegister {
        line,
        token: word.to_string(),
    })?;
    if reg.is_protected() {
        return Err(AsmError::ProtectedRegister {
            line,
            token: word.to_string(),
        });
    }
    Ok(reg)
}

/// A register or an immediate.
fn expect_value(word: &str, line: usize, form: &'static str) -> Result<Token, AsmError> {
    if looks_numeric(word) {
        Ok(Token::Imm(parse_immediate(word, line)?))
    } else {
        Ok(Token::Reg(expect_register(word, line, form)?))
    }
}
