//! Line scanner for regsim assembly text.

use crate::error::AsmError;

/// The content of one non-blank source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    /// `name:` with the colon removed. Case is preserved.
    Label(&'a str),
    /// A mnemonic (not yet lowercased) and the raw operand text after it.
    Instruction { mnemonic: &'a str, operands: &'a str },
}

/// Classify a single line of assembly text.
///
/// Returns `None` for blank lines and comment-only lines.
/// Comments start with `;` and extend to end of line.
pub(crate) fn scan_line(line: &str, line_num: usize) -> Result<Option<Line<'_>>, AsmError> {
    // Strip comment
    let line = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(name) = line.strip_suffix(':') {
        if !is_identifier(name) {
            return Err(AsmError::InvalidLabel {
                line: line_num,
                token: line.to_string(),
            });
        }
        return Ok(Some(Line::Label(name)));
    }

    let (mnemonic, operands) = match line.split_once(char::is_whitespace) {
        Some((m, rest)) => (m, rest.trim()),
        None => (line, ""),
    };
    Ok(Some(Line::Instruction { mnemonic, operands }))
}

/// Words of an operand list, split on whitespace and commas.
pub(crate) fn words(operands: &str) -> impl Iterator<Item = &str> {
    operands
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|w| !w.is_empty())
}

/// `[A-Za-z_.][A-Za-z0-9_.]*`
pub(crate) fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '.' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Whether a word is meant as a numeric literal: an optional sign then a digit.
pub(crate) fn looks_numeric(word: &str) -> bool {
    let digits = word
        .strip_prefix('-')
        .or_else(|| word.strip_prefix('+'))
        .unwrap_or(word);
    digits.as_bytes().first().is_some_and(|b| b.is_ascii_digit())
}

/// Parse a base-10 literal into its 32-bit pattern.
///
/// Accepts `-2^31 ..= 2^32 - 1`; negative values wrap to two's complement.
pub(crate) fn parse_immediate(word: &str, line_num: usize) -> Result<u32, AsmError> {
    let invalid = || AsmError::InvalidImmediate {
        line: line_num,
        token: word.to_string(),
    };
    let value: i64 = word.parse().map_err(|_| invalid())?;
    if value < i32::MIN as i64 || value > u32::MAX as i64 {
        return Err(invalid());
    }
    Ok(value as u32)
}
